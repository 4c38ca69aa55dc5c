//! A stopwatch: a renderer printing a counting controller's emissions.
//!
//! The controller ticks once a second for as long as it lives. Disposing it
//! stops the ticking mid-wait; the re-activation halfway through shows that
//! activating a running controller changes nothing.
use tether::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let stopwatch = ScopedController::counting(1_000);
    let token = stopwatch.subscribe(|state: &OutcomeState<u64>| match state {
        OutcomeState::Loading => println!("starting…"),
        OutcomeState::Value(seconds) => println!("{}s", seconds),
        OutcomeState::Failure(reason) => println!("stopwatch failed: {}", reason),
    });

    stopwatch.activate()?;

    smol::block_on(async {
        wait_millis(2_500).await;
        // The UI "re-attached"; the running producer is not duplicated.
        stopwatch.activate()?;
        wait_millis(3_000).await;
        Ok::<_, ControllerError>(())
    })?;

    stopwatch.dispose();
    stopwatch.unsubscribe(token);
    println!("disposed after 5.5s; no further ticks will print");
    Ok(())
}
