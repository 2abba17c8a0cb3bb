//! Print today's board
//!
//! The token is read from the session file. When there is none, the binary logs in with the `TODO_EMAIL` and
//! `TODO_PASSWORD` environment variables and stores the new token.

use everyday_tasks::auth::LoginForm;
use everyday_tasks::client::Client;
use everyday_tasks::config;
use everyday_tasks::session::FileSession;
use everyday_tasks::traits::SessionStore;
use everyday_tasks::Board;

#[tokio::main]
async fn main() {
    env_logger::init();

    let client = match Client::from_config() {
        Ok(c) => c,
        Err(err) => {
            log::error!("Invalid server URL {}: {}", config::api_url(), err);
            std::process::exit(1);
        }
    };

    let mut session = FileSession::open(&config::session_file());
    if session.token().is_none() {
        let mut form = LoginForm::new();
        form.email = std::env::var("TODO_EMAIL").unwrap_or_default();
        form.password = std::env::var("TODO_PASSWORD").unwrap_or_default();
        if form.submit(&client, &mut session).await.is_err() {
            eprintln!("{}", form.error().unwrap_or("Connexion impossible"));
            std::process::exit(1);
        }
    }

    let today = chrono::Local::now().date_naive();
    let mut board = match Board::from_session(client, &session, today) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    board.mount(today).await;
    print!("{}", board.view());
}
