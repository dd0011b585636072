use std::error::Error;

use tilework::rhythm::SystemClock;
use tilework::step::describe;
use tilework::synth::{LevelStore, MemoryLevelStore};
use tilework::{Campaign, Session};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

// authored levels, followed by a few synthesized ones
const LEVELS: usize = 8;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(LevelFilter::INFO)
        .init();

    let campaign = Campaign::from_json(include_str!("../campaign.json"))?;
    let mut store = MemoryLevelStore::default();
    let mut config = campaign.current(&store);

    for _ in 0..LEVELS {
        let mut session = Session::initialize(config, SystemClock::default())?;
        println!("level {} ({})", store.current_level() + 1, session.config().modes);
        print!("{}", session.state());
        print!("{}", describe(session.solution()));

        // replayed directly: the rhythm gate would need a playing track
        for step in session.solution().to_vec() {
            session.apply(step);
        }
        print!("{}", session.state());
        assert!(session.is_complete());
        info!(level = store.current_level(), steps = session.solution().len(), "solved");

        config = campaign.advance(&mut store);
    }

    Ok(())
}
