use npcgen::rng::EngineRng;
use npcgen::tables::TableStore;
use std::collections::BTreeMap;

const DEFAULT_DRAWS: u32 = 10_000;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let root = args.get(1).map(String::as_str).unwrap_or("data");
    let draws = match args.get(2).map(|value| value.trim().parse::<u32>()) {
        None => DEFAULT_DRAWS,
        Some(Ok(draws)) if draws > 0 => draws,
        Some(_) => {
            eprintln!("usage: tier_sample [table-root] [draws>0] [seed]");
            std::process::exit(1);
        }
    };
    let mut rng = match args.get(3).and_then(|value| value.trim().parse::<u64>().ok()) {
        Some(seed) => EngineRng::from_seed(seed),
        None => EngineRng::from_entropy(),
    };

    let store = TableStore::new(root);
    let tiers = &store.load().tiers;
    let mut counts: BTreeMap<i32, u32> = BTreeMap::new();
    for _ in 0..draws {
        *counts.entry(tiers.pick(&mut rng).id).or_default() += 1;
    }

    let total_weight = tiers.total_weight().max(1) as f64;
    println!("tiers: {} (total weight {})", tiers.len(), tiers.total_weight());
    for tier in tiers.iter() {
        let seen = counts.get(&tier.id).copied().unwrap_or(0);
        println!(
            "{:>3} {:<16} weight={:<5} expected={:>6.2}% observed={:>6.2}%",
            tier.id,
            tier.name,
            tier.weight,
            tier.weight.max(0) as f64 * 100.0 / total_weight,
            seen as f64 * 100.0 / draws as f64
        );
    }
}
