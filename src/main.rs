use anyhow::Context;
use shopping_list::state::AppState;
use shopping_list::telemetry;
use shopping_list::ui::UiState;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let app = AppState::init().await.context("initialise app state")?;
    info!(url = %app.config.database.url, "store opened");

    let (overview, mut events) = app.shopping_lists_view_model();
    let mut state = overview.state();
    overview.load();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                match &*state.borrow_and_update() {
                    UiState::Idle => info!("overview idle"),
                    UiState::Loading => info!("overview loading"),
                    UiState::Success(data) => {
                        let names: Vec<&str> = data.lists.iter().map(|l| l.name.as_str()).collect();
                        info!(count = names.len(), ?names, "shopping lists");
                    }
                    UiState::Error { message } => tracing::error!(%message, "overview failed"),
                }
            }
            Some(event) = events.recv() => info!(?event, "ui event"),
            res = &mut shutdown => {
                res.context("listen for ctrl-c")?;
                info!("shutting down");
                break;
            }
        }
    }

    overview.clear();
    app.db.close().await;
    Ok(())
}
