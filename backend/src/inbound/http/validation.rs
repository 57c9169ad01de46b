//! Conversion of request bodies and path segments into domain values.
//!
//! Field-level failures become `invalid_request` errors whose `errors` map
//! is keyed by the wire field name.

use super::dto::{AddEggsRequest, FriendRequestBody, LoginRequest, RegisterRequest};
use crate::domain::{
    EggAmount, EggEntryId, Error, FieldErrors, FriendTarget, FriendshipId, LoginCredentials,
    Registration, UserId, Username,
};

const AMOUNT_FIELD: &str = "amount";
const TO_USER_ID_FIELD: &str = "toUserId";
const USERNAME_FIELD: &str = "username";

fn field_error(field: &str, message: impl Into<String>) -> Error {
    let mut errors = FieldErrors::default();
    errors.insert(field, message);
    Error::validation(errors)
}

pub(crate) fn registration_from(body: &RegisterRequest) -> Result<Registration, Error> {
    Registration::try_from_parts(
        &body.username,
        &body.firstname,
        &body.lastname,
        &body.email,
        &body.password,
    )
    .map_err(Error::validation)
}

pub(crate) fn login_from(body: &LoginRequest) -> Result<LoginCredentials, Error> {
    LoginCredentials::try_from_parts(&body.email, &body.password)
        .map_err(|err| field_error(err.field(), err.to_string()))
}

pub(crate) fn egg_amount_from(body: &AddEggsRequest) -> Result<EggAmount, Error> {
    let raw = body
        .amount
        .ok_or_else(|| field_error(AMOUNT_FIELD, "Amount is required"))?;
    EggAmount::new(raw).map_err(|err| field_error(AMOUNT_FIELD, err.to_string()))
}

pub(crate) fn friend_target_from(body: &FriendRequestBody) -> Result<FriendTarget, Error> {
    let id = body.to_user_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let username = body.username.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match (id, username) {
        (Some(raw), None) => UserId::new(raw)
            .map(FriendTarget::Id)
            .map_err(|_| field_error(TO_USER_ID_FIELD, "Invalid user id")),
        (None, Some(raw)) => Username::new(raw)
            .map(FriendTarget::Username)
            .map_err(|err| field_error(USERNAME_FIELD, err.to_string())),
        (Some(_), Some(_)) => Err(Error::invalid_request(
            "Provide either toUserId or username, not both",
        )),
        (None, None) => Err(Error::invalid_request("Provide toUserId or username")),
    }
}

pub(crate) fn entry_id_from(raw: i64) -> Result<EggEntryId, Error> {
    if raw <= 0 {
        return Err(Error::invalid_request("Invalid entry ID"));
    }
    Ok(EggEntryId::new(raw))
}

pub(crate) fn friendship_id_from(raw: i64) -> Result<FriendshipId, Error> {
    if raw <= 0 {
        return Err(Error::invalid_request("Invalid friend request ID"));
    }
    Ok(FriendshipId::new(raw))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    fn body(to_user_id: Option<&str>, username: Option<&str>) -> FriendRequestBody {
        FriendRequestBody {
            to_user_id: to_user_id.map(str::to_owned),
            username: username.map(str::to_owned),
        }
    }

    #[rstest]
    fn missing_amount_is_a_field_error() {
        let err = egg_amount_from(&AddEggsRequest { amount: None }).expect_err("missing");
        let errors = err.field_errors().expect("field errors");
        assert_eq!(errors.get(AMOUNT_FIELD), Some("Amount is required"));
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    #[case(1_001)]
    fn out_of_range_amount_is_rejected(#[case] amount: i64) {
        let err = egg_amount_from(&AddEggsRequest {
            amount: Some(amount),
        })
        .expect_err("out of range");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.field_errors().and_then(|e| e.get(AMOUNT_FIELD)).is_some());
    }

    #[rstest]
    fn friend_target_by_username() {
        let target = friend_target_from(&body(None, Some(" rooster "))).expect("valid");
        assert!(matches!(target, FriendTarget::Username(name) if name.as_str() == "rooster"));
    }

    #[rstest]
    fn friend_target_by_id() {
        let id = UserId::random();
        let target = friend_target_from(&body(Some(&id.to_string()), None)).expect("valid");
        assert_eq!(target, FriendTarget::Id(id));
    }

    #[rstest]
    #[case(body(None, None))]
    #[case(body(Some("  "), Some("")))]
    #[case(body(Some("3fa85f64-5717-4562-b3fc-2c963f66afa6"), Some("rooster")))]
    fn friend_target_needs_exactly_one_field(#[case] request: FriendRequestBody) {
        let err = friend_target_from(&request).expect_err("ambiguous");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn malformed_user_id_is_a_field_error() {
        let err = friend_target_from(&body(Some("not-a-uuid"), None)).expect_err("bad id");
        let errors = err.field_errors().expect("field errors");
        assert_eq!(errors.get(TO_USER_ID_FIELD), Some("Invalid user id"));
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    fn non_positive_ids_are_rejected(#[case] raw: i64) {
        assert!(entry_id_from(raw).is_err());
        assert!(friendship_id_from(raw).is_err());
    }

    #[rstest]
    fn login_reports_the_blank_field() {
        let err = login_from(&LoginRequest {
            email: "hen@farm.com".to_owned(),
            password: String::new(),
        })
        .expect_err("blank password");
        let errors = err.field_errors().expect("field errors");
        assert_eq!(errors.get("password"), Some("Password is required"));
    }
}
