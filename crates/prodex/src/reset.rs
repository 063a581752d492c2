use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
#[command(about = "Restore the built-in catalog")]
pub struct ResetArgs {}

pub fn execute(_args: ResetArgs) -> Result<()> {
    let (_, mut session) = crate::open_session()?;
    let update = session.reset();
    if update.save_error.is_some() {
        println!("{} {update}", "!".yellow().bold());
    } else {
        println!("{} {update}", "✓".green().bold());
    }
    Ok(())
}
