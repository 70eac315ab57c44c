//! `alfred guests` — query the guest index directly.

use alfred_retrieval::NO_MATCH;

use super::setup;

pub async fn run(query: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config()?;
    let index = setup::build_index(&config).await?;

    let hits = index.search(query, limit);
    if hits.is_empty() {
        println!("{NO_MATCH}");
        return Ok(());
    }

    for hit in hits {
        println!("#{}  score {:.3}", hit.index, hit.score);
        for line in hit.text.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}
