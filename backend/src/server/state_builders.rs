//! Builders wiring domain services over the configured adapters.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use eggcounter::domain::ports::{
    EggLedger, EggLedgerRepository, FriendGraph, FriendshipRepository, IdentityStore,
    PasswordHasher, SessionResolver, SessionStore, UserRepository,
};
use eggcounter::domain::{
    EggLedgerService, FriendGraphService, IdentityService, SessionService,
};
use eggcounter::inbound::http::state::{HttpState, HttpStatePorts};
use eggcounter::outbound::memory::{
    InMemoryEggLedgerRepository, InMemoryFriendshipRepository, InMemoryUserRepository,
};
use eggcounter::outbound::persistence::{
    DbPool, DieselEggLedgerRepository, DieselFriendshipRepository, DieselUserRepository,
    PoolConfig, run_pending_migrations,
};
use eggcounter::outbound::security::Argon2Hasher;
use eggcounter::outbound::session::{InMemorySessionStore, RedisSessionStore};

use super::ServerConfig;
use super::settings::Persistence;

/// Repositories sharing one backend.
struct Repositories<U, E, F> {
    users: Arc<U>,
    eggs: Arc<E>,
    friendships: Arc<F>,
}

fn ports_over<U, E, F>(
    repos: Repositories<U, E, F>,
    sessions: Arc<dyn SessionResolver>,
    hasher: Arc<dyn PasswordHasher>,
    clock: &Arc<dyn Clock>,
    config: &ServerConfig,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    E: EggLedgerRepository + 'static,
    F: FriendshipRepository + 'static,
{
    let identity: Arc<dyn IdentityStore> = Arc::new(IdentityService::new(
        repos.users.clone(),
        hasher,
        clock.clone(),
        config.deadline,
    ));
    let eggs: Arc<dyn EggLedger> = Arc::new(EggLedgerService::new(
        repos.eggs,
        clock.clone(),
        config.deadline,
    ));
    let friends: Arc<dyn FriendGraph> = Arc::new(FriendGraphService::new(
        repos.friendships,
        repos.users,
        clock.clone(),
        config.deadline,
    ));
    HttpStatePorts {
        identity,
        sessions,
        eggs,
        friends,
    }
}

fn session_resolver<S>(
    store: Arc<S>,
    clock: &Arc<dyn Clock>,
    config: &ServerConfig,
) -> Arc<dyn SessionResolver>
where
    S: SessionStore + 'static,
{
    Arc::new(SessionService::new(
        store,
        clock.clone(),
        config.session_ttl,
        config.deadline,
    ))
}

async fn build_sessions(
    config: &ServerConfig,
    clock: &Arc<dyn Clock>,
) -> Result<Arc<dyn SessionResolver>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisSessionStore::connect(
                url,
                config.db_max_connections,
                config.deadline.timeout(),
            )
            .await
            .wrap_err("failed to connect the Redis session store")?;
            info!("sessions stored in Redis");
            Ok(session_resolver(Arc::new(store), clock, config))
        }
        None => {
            warn!("EGGCOUNTER_REDIS_URL not set; sessions are process-local");
            Ok(session_resolver(
                Arc::new(InMemorySessionStore::new(clock.clone())),
                clock,
                config,
            ))
        }
    }
}

/// Build the HTTP state for `config`, running migrations first when a
/// database is configured.
pub async fn build_http_state(config: &ServerConfig) -> Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher: Arc<dyn PasswordHasher> =
        Arc::new(Argon2Hasher::new().wrap_err("failed to initialise the password hasher")?);
    let sessions = build_sessions(config, &clock).await?;

    let ports = match &config.persistence {
        Persistence::Postgres { database_url } => {
            run_pending_migrations(database_url)
                .await
                .wrap_err("failed to apply database migrations")?;
            let pool = DbPool::new(
                PoolConfig::new(database_url.as_str())
                    .with_max_size(config.db_max_connections)
                    .with_connection_timeout(config.deadline.timeout()),
            )
            .await
            .wrap_err("failed to build the database pool")?;
            info!(max_connections = config.db_max_connections, "using PostgreSQL persistence");
            let repos = Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                eggs: Arc::new(DieselEggLedgerRepository::new(pool.clone())),
                friendships: Arc::new(DieselFriendshipRepository::new(pool)),
            };
            ports_over(repos, sessions, hasher, &clock, config)
        }
        Persistence::InMemory => {
            warn!("no database configured; data is lost on restart");
            let repos = Repositories {
                users: Arc::new(InMemoryUserRepository::new()),
                eggs: Arc::new(InMemoryEggLedgerRepository::new()),
                friendships: Arc::new(InMemoryFriendshipRepository::new()),
            };
            ports_over(repos, sessions, hasher, &clock, config)
        }
    };

    Ok(HttpState::new(ports, config.cookies))
}
