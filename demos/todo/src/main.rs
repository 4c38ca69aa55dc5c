//! Two one-shot fetch controllers side by side: one succeeds, one fails.
//!
//! The "transport" is a delay plus a canned JSON body, standing in for the
//! excluded network layer. Each renderer prints the loading / value /
//! failure states as they are published.
use serde::Deserialize;
use tether::prelude::*;

/// The payload shape of the simulated todo endpoint.
#[derive(Clone, Debug, Deserialize)]
struct Todo {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    completed: bool,
}

const TODO_BODY: &str =
    r#"{"userId": 1, "id": 1, "title": "delectus aut autem", "completed": false}"#;

async fn fetch_todo() -> Result<Todo, ProducerError> {
    // Stands in for a network round trip.
    wait_millis(300).await;
    decode_json(TODO_BODY)
}

async fn fetch_todo_from_dead_server() -> Result<Todo, ProducerError> {
    wait_millis(300).await;
    Err(ProducerError::Transport("connection refused".to_string()))
}

fn render(label: &'static str) -> impl Fn(&OutcomeState<Todo>) + Send + Sync + 'static {
    move |state| match state {
        OutcomeState::Loading => println!("[{}] loading…", label),
        OutcomeState::Value(todo) => println!(
            "[{}] todo #{} for user {}: {:?} (completed: {})",
            label, todo.id, todo.user_id, todo.title, todo.completed
        ),
        OutcomeState::Failure(reason) => println!("[{}] {}", label, reason),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let good = ScopedController::fetching(fetch_todo());
    let bad = ScopedController::fetching(fetch_todo_from_dead_server());
    good.subscribe(render("todo"));
    bad.subscribe(render("dead server"));

    good.activate()?;
    bad.activate()?;

    smol::block_on(wait_millis(800));
    Ok(())
}
