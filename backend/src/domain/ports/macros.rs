//! Helper macro generating port error enums with snake_case constructors.
//!
//! Variant docs come from the invocation; constructors and fields get a
//! generated one-liner.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            #[must_use]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( {
                    $(
                        #[doc = concat!("`", stringify!($field), "` reported by the adapter.")]
                        $field : $ty
                    ),*
                } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        /// Errors exercised by the tests below.
        pub enum SamplePortError {
            Refused { message: String } => "refused: {message}",
            Stale { entry_id: i64 } => "stale entry {entry_id}",
            Mixed { message: String, entry_id: i64 } => "mixed: {message} ({entry_id})",
            Gone => "gone",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = SamplePortError::refused("timeout");
        assert_eq!(err.to_string(), "refused: timeout");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = SamplePortError::stale(42_i64);
        assert_eq!(err.to_string(), "stale entry 42");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SamplePortError::mixed("late", 9_i64);
        assert_eq!(err.to_string(), "mixed: late (9)");
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SamplePortError::gone(), SamplePortError::Gone);
    }
}
