use std::{env, net::{SocketAddr, ToSocketAddrs as _}};

use sea_orm::ConnectOptions;
use tracing::info;

use crate::{consts, render::{money::{CurrencyFormat, NumberLocale}, RenderSettings}};

pub struct Config {
    pub host_address: SocketAddr,

    pub database_opt: ConnectOptions,

    pub jwt_key: String,

    pub render_settings: RenderSettings,

    pub run_migrations: bool,
}

pub fn load() -> Config {
    Config {
        host_address: load_host_address(),
        database_opt: load_database_opt().into(),
        jwt_key: load_jwt_key(),
        render_settings: RenderSettings {
            institution_name: load_institution_name(),
            currency: CurrencyFormat::new(load_currency_symbol(), load_number_locale()),
        },
        run_migrations: load_run_migrations(),
    }
}

fn load_host_address() -> SocketAddr {
    info!("Loading environment `HOST_ADDRESS`");

    let var = env::var("HOST_ADDRESS").unwrap_or_else(|_| "127.0.0.1:0".to_string());

    var.to_socket_addrs()
        .expect("`HOST_ADDRESS` is not in a valid format").nth(0)
        .expect("unable to resolve host from `HOST_ADDRESS`")
}

fn load_database_opt() -> impl Into<ConnectOptions> {
    info!("Loading environment `DATABASE_URL`");

    env::var("DATABASE_URL").expect("Environment `DATABASE_URL` is required to be set")
}

fn load_jwt_key() -> String {
    info!("Loading environment `JWT_SECRET`");

    env::var("JWT_SECRET").expect("Environment `JWT_SECRET` is required to be set")
}

fn load_institution_name() -> String {
    info!("Loading environment `INSTITUTION_NAME`");

    env::var("INSTITUTION_NAME").unwrap_or_else(|_| consts::DEFAULT_INSTITUTION_NAME.to_string())
}

fn load_currency_symbol() -> String {
    info!("Loading environment `CURRENCY_SYMBOL`");

    env::var("CURRENCY_SYMBOL").unwrap_or_else(|_| consts::DEFAULT_CURRENCY_SYMBOL.to_string())
}

fn load_number_locale() -> NumberLocale {
    info!("Loading environment `NUMBER_LOCALE`");

    match env::var("NUMBER_LOCALE") {
        Ok(var) => var.parse().unwrap_or_else(|err| panic!("`NUMBER_LOCALE` is invalid: {err}")),
        Err(_) => NumberLocale::default(),
    }
}

fn load_run_migrations() -> bool {
    info!("Loading environment `RUN_MIGRATIONS`");

    env::var("RUN_MIGRATIONS").is_ok_and(|var| matches!(var.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}
