//! `alfred tools` — list the tools the model can call.

use std::sync::Arc;

use alfred_retrieval::RetrievalIndex;

use super::setup;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config()?;
    // Descriptors don't depend on the corpus, so skip fetching it.
    let registry = setup::build_registry(Arc::new(RetrievalIndex::build(&[])), &config);

    println!("Available tools");
    println!("===============");
    println!();
    for def in registry.definitions() {
        println!("  {}", def.name);
        println!("    {}", def.description);
        println!("    parameters: {}", serde_json::to_string(&def.parameters)?);
        println!();
    }
    Ok(())
}
