//! Memory command for inspecting and resetting the learned hourly bias.

use clap::Subcommand;

use meterspread_core::{Database, KvWeightMemory};

#[derive(Subcommand)]
pub enum MemoryAction {
    /// Show the learned bias for each hour
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget everything learned so far
    Reset,
}

pub fn run(action: MemoryAction) -> meterspread_core::error::Result<()> {
    let db = Database::open()?;
    let memory = KvWeightMemory::new(&db);

    match action {
        MemoryAction::Show { json } => {
            let learned = memory.load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&learned)?);
                return Ok(());
            }

            println!("{}", learned.render_ascii_chart());
            let hours_with_data = learned.entries().count();
            println!("Summary:");
            println!("  Samples recorded: {}", learned.total_samples());
            println!("  Hours with data: {}/24", hours_with_data);
            if learned.is_empty() {
                println!("\n  Tip: run `split` a few times to build the hourly profile.");
            }
        }
        MemoryAction::Reset => {
            memory.reset()?;
            println!("weight memory reset");
        }
    }
    Ok(())
}
