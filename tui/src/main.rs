mod app;
mod chat;
mod errors;
mod handler;
mod ui;
mod widgets;

use crate::app::App;

#[tokio::main]
async fn main() -> app::AppResult<()> {
    let mut terminal = ratatui::init();
    let mut app = App::new();
    let result = app.run(&mut terminal).await;
    ratatui::restore();
    result
}
