//! # Seed Data Generator
//!
//! Fills a database with sample tags for UI development.
//!
//! ## Usage
//! ```bash
//! # 8 tags on a free account (stops at the free cap)
//! cargo run -p tagwriter-db --bin seed
//!
//! # 200 tags on a premium account
//! cargo run -p tagwriter-db --bin seed -- --count 200 --premium
//!
//! # Specify database path
//! cargo run -p tagwriter-db --bin seed -- --db ./data/tagwriter.db
//! ```
//!
//! Every fourth tag gets a note, every seventh is locked (premium only) and
//! creation times are spread over the last 30 days so the "Recent" filter
//! has something to hide.

use chrono::{Duration, Utc};
use std::env;
use tagwriter_core::{CoreError, Inventory, NewTag, TagType, TierState, DEFAULT_FREE_TAG_CAP};
use tagwriter_db::migrations::migration_status;
use tagwriter_db::{Database, DbConfig, SnapshotStore};
use uuid::Uuid;

/// Venue names and the path each one links to.
const VENUES: &[(&str, &str)] = &[
    ("Front Desk", "check-in"),
    ("Table Menu", "menu"),
    ("Guest Wifi", "wifi"),
    ("Leave a Review", "reviews"),
    ("Event Poster", "events"),
    ("Business Card", "contact"),
    ("Product Shelf", "catalog"),
    ("Loyalty Card", "rewards"),
];

const NOTES: &[&str] = &[
    "Laminated, replace monthly",
    "Behind the counter",
    "Sticker on window",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 8;
    let mut db_path = String::from("./tagwriter_dev.db");
    let mut premium = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(8);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--premium" | "-p" => premium = true,
            "--help" | "-h" => {
                println!("Tagwriter Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of tags to generate (default: 8)");
                println!("  -d, --db <PATH>    Database file path (default: ./tagwriter_dev.db)");
                println!("  -p, --premium      Seed a premium account (no cap, locked tags)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tagwriter Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Tags:     {}", count);
    println!("Tier:     {}", if premium { "premium" } else { "free" });
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = db.snapshots();

    if !db.health_check().await {
        return Err("database did not answer a health check".into());
    }
    println!("✓ Connected to database");

    let (total, applied) = migration_status(db.pool()).await?;
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = store.load().await?;
    if !existing.records().is_empty() {
        println!("⚠ Database already has {} tags", existing.total_count());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut inventory = Inventory::new(TierState::free(DEFAULT_FREE_TAG_CAP));
    if premium {
        inventory.activate_premium();
    }

    let now = Utc::now();
    let mut generated = 0;

    for n in 0..count {
        let draft = sample_tag(n, premium);
        let created = now - Duration::hours((n as i64 * 37) % (30 * 24));

        match inventory.add(draft, Uuid::new_v4().to_string(), created) {
            Ok(_) => generated += 1,
            Err(CoreError::TierLimitExceeded { cap }) => {
                println!("⚠ Free tier cap of {} reached, stopping early", cap);
                break;
            }
            Err(e) => {
                eprintln!("Failed to add tag {}: {}", n, e);
            }
        }
    }

    // A few taps so the analytics screen has a most-used tag.
    let ids: Vec<String> = inventory.records().iter().map(|r| r.id.clone()).collect();
    for (n, id) in ids.iter().enumerate() {
        for _ in 0..(n % 5) {
            inventory.record_access(id, now);
        }
    }

    store.save(&inventory).await?;

    let stats = inventory.stats();
    println!();
    println!("✓ Generated {} tags", generated);
    println!("  Locked:   {}", stats.locked);
    println!("  Accesses: {}", stats.total_accesses);
    if let Some(top) = stats.most_used {
        println!("  Most used: {} ({} taps)", top.name, top.access_count);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds the `n`th sample tag.
fn sample_tag(n: usize, premium: bool) -> NewTag {
    let (venue, path) = VENUES[n % VENUES.len()];
    let tag_type = TagType::ALL[n % TagType::ALL.len()];

    let mut draft = NewTag::new(
        format!("{} #{}", venue, n + 1),
        format!("https://cafe.example/{}?t={}", path, n + 1),
        tag_type,
    );

    if n % 4 == 0 {
        draft = draft.notes(NOTES[n % NOTES.len()]);
    }
    if premium && n % 7 == 6 {
        draft = draft.locked(true);
        if n % 14 == 13 {
            draft = draft.password("0000");
        }
    }

    draft
}
