use serde_json::json;

use crate::cli::{open_store, OutputFormat};
use crate::config::config;
use crate::database::{ListingImage, NewListing, NewUser, Store, StoreError};

pub const SEED_USERNAME: &str = "wanderlust";
const SEED_EMAIL: &str = "seed@wanderlust.local";
const SEED_PASSWORD: &str = "wanderlust";

struct Sample {
    title: &'static str,
    description: &'static str,
    image: &'static str,
    price: &'static str,
    location: &'static str,
    country: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "Cozy Beachfront Cottage",
        description: "Escape to this charming beachfront cottage for a relaxing getaway.",
        image: "https://images.unsplash.com/photo-1552733407-5d5c46c3bb3b?w=800",
        price: "1500",
        location: "Malibu",
        country: "United States",
    },
    Sample {
        title: "Modern Loft in Downtown",
        description: "Stay in the heart of the city in this stylish loft apartment.",
        image: "https://images.unsplash.com/photo-1501785888041-af3ef285b470?w=800",
        price: "1200",
        location: "New York City",
        country: "United States",
    },
    Sample {
        title: "Mountain Retreat",
        description: "Unplug and unwind in this peaceful mountain cabin.",
        image: "https://images.unsplash.com/photo-1571896349842-33c89424de2d?w=800",
        price: "1000",
        location: "Aspen",
        country: "United States",
    },
    Sample {
        title: "Historic Villa in Tuscany",
        description: "Experience the charm of Tuscany in this restored villa.",
        image: "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=800",
        price: "2500",
        location: "Florence",
        country: "Italy",
    },
    Sample {
        title: "Secluded Treehouse Getaway",
        description: "Live among the treetops in this unique treehouse retreat.",
        image: "https://images.unsplash.com/photo-1488462237308-ecaa28b729d7?w=800",
        price: "800",
        location: "Portland",
        country: "United States",
    },
    Sample {
        title: "Ski-In/Ski-Out Chalet",
        description: "Hit the slopes right from your doorstep in this chalet.",
        image: "https://images.unsplash.com/photo-1502784444187-359ac186c5bb?w=800",
        price: "3000",
        location: "Cortina d'Ampezzo",
        country: "Italy",
    },
];

/// Replace every listing with the sample set, owned by the seed user.
/// Returns the owner's username and the number of listings inserted.
pub async fn load(store: &dyn Store) -> anyhow::Result<(String, usize)> {
    let owner = match store.find_user_by_username(SEED_USERNAME).await? {
        Some(user) => user,
        None => match store
            .insert_user(NewUser::new(SEED_USERNAME, SEED_EMAIL, SEED_PASSWORD)?)
            .await
        {
            Ok(user) => user,
            Err(StoreError::Conflict(message)) => anyhow::bail!(message),
            Err(e) => return Err(e.into()),
        },
    };

    let removed = store.clear_listings().await?;
    tracing::debug!("Cleared {} existing listings", removed);

    for sample in SAMPLES {
        store
            .insert_listing(NewListing {
                title: sample.title.to_string(),
                description: Some(sample.description.to_string()),
                image: Some(ListingImage::from_url(sample.image)),
                price: Some(sample.price.to_string()),
                location: Some(sample.location.to_string()),
                country: Some(sample.country.to_string()),
                owner: owner.id,
            })
            .await?;
    }

    Ok((owner.username, SAMPLES.len()))
}

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set to seed a persistent store");
    }

    let store = open_store(config).await?;
    let loaded = load(store.as_ref()).await;
    store.close().await;
    let (owner, count) = loaded?;

    match output_format {
        OutputFormat::Json => {
            println!("{}", json!({ "success": true, "data": { "owner": owner, "listings": count } }));
        }
        OutputFormat::Text => {
            println!("Seeded {} listings owned by '{}'", count, owner);
        }
    }

    Ok(())
}
