use anyhow::Result;
use now_mcp_tools::Dispatcher;

/// Prints the exposed tool listing as JSON.
pub fn run(dispatcher: &Dispatcher) -> Result<()> {
    let listing = serde_json::to_string_pretty(&dispatcher.list_tools())?;
    println!("{}", listing);
    Ok(())
}
