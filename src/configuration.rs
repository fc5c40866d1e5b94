use std::{env, fs, ops::Deref, path::Path, sync::Arc};

use crate::{
    error::Error,
    provider::{DatabasePool, HTTP},
    vapid::VapidKeys,
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub http: HTTP,
}

impl State {
    pub fn new(config: Config, database: DatabasePool, http: HTTP) -> State {
        Self {
            config,
            database,
            http,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub timeout: u64,
    pub session_cookie: String,
    pub status_code_to_delete: Vec<u16>,
    pub mail_to: String,
    pub push_ttl: i64,
    pub vapid: VapidKeys,
    pub auth: String,
}

const DEFAULT_MAX_CONNECTIONS: &str = "20";
const DEFAULT_SESSION_COOKIE: &str = "session";
const DEFAULT_STATUS_CODE_TO_DELETE: &str = "404,410";
const DEFAULT_PUSH_TTL: &str = "86400";
const DEFAULT_VAPID_PRIVATE_KEY: &str = "cert/vapid_private.pem";
const DEFAULT_VAPID_PUBLIC_KEY: &str = "cert/vapid_public.b64";

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_status_codes(value: &str) -> Result<Vec<u16>, Error> {
    let mut codes = vec![];
    for code in parse_list(value) {
        codes.push(code.parse::<u16>()?);
    }
    Ok(codes)
}

pub fn get_configuration() -> Result<Config, Error> {
    let database_url = env::var("DATABASE_URL")?;
    let database_max_connections =
        var_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS).parse()?;
    let server_host = env::var("SERVER_HOST")?;
    let port: u16 = env::var("PORT")?.parse()?;
    let allowed_origins = parse_list(&env::var("ALLOWED_ORIGINS")?);
    let timeout = env::var("TIMEOUT")?.parse()?;
    let session_cookie = var_or("SESSION_COOKIE", DEFAULT_SESSION_COOKIE);
    let status_code_to_delete = parse_status_codes(&var_or(
        "STATUS_CODE_TO_DELETE",
        DEFAULT_STATUS_CODE_TO_DELETE,
    ))?;
    let mail_to: String = env::var("MAIL_TO")?;
    let push_ttl = var_or("PUSH_TTL", DEFAULT_PUSH_TTL).parse()?;
    let auth = env::var("AUTH")?;

    let vapid = VapidKeys::load(
        &var_or("VAPID_PRIVATE_KEY_PATH", DEFAULT_VAPID_PRIVATE_KEY),
        &var_or("VAPID_PUBLIC_KEY_PATH", DEFAULT_VAPID_PUBLIC_KEY),
    )?;

    let config = Config {
        database_url,
        database_max_connections,
        server_host,
        port,
        allowed_origins,
        timeout,
        session_cookie,
        status_code_to_delete,
        mail_to,
        push_ttl,
        vapid,
        auth,
    };

    Ok(config)
}

/// Loads `.env` from the working directory into the process environment.
/// Variables already present in the environment win.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    if !Path::new(config_file).exists() {
        return Ok(());
    }

    let config_string = fs::read_to_string(config_file)?;

    for (key, value) in parse_config_string(&config_string) {
        if env::var_os(&key).is_none() {
            env::set_var(key, value);
        }
    }

    Ok(())
}

fn parse_config_string(config: &str) -> Vec<(String, String)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| {
            let value = v.trim().trim_matches('"');
            (k.trim().to_owned(), value.to_owned())
        })
        .collect()
}
