//! Default reference data.
//!
//! Seeds the city locations and a handful of example suggestions. Each table
//! is only seeded while it is empty, so running this on every start is safe.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::entities::{LocationEntity, SuggestionEntity, SuggestionLocationEntity};
use crate::error::RepositoryError;
use crate::filter::Filter;
use crate::metrics::QueryTimer;
use crate::unit_of_work::UnitOfWork;

const DEFAULT_STREET: &str = "Main Street";

/// City name and picture URL of every seeded location.
const CITIES: &[(&str, &str)] = &[
    ("Blagoevgrad", "https://upload.wikimedia.org/wikipedia/commons/thumb/3/30/%D0%91%D0%BB%D0%B0%D0%B3%D0%BE%D0%B5%D0%B2%D0%B3%D1%80%D0%B0%D0%B4_-_panoramio_%2826%29.jpg/1024px-%D0%91%D0%BB%D0%B0%D0%B3%D0%BE%D0%B5%D0%B2%D0%B3%D1%80%D0%B0%D0%B4_-_panoramio_%2826%29.jpg"),
    ("Burgas", "https://dynamic-media-cdn.tripadvisor.com/media/photo-o/08/19/fe/30/getlstd-property-photo.jpg?w=1200&h=-1&s=1"),
    ("Dobrich", "https://upload.wikimedia.org/wikipedia/commons/thumb/1/18/Dobrich_Sunrise%2C_Winter_2014.JPG/1280px-Dobrich_Sunrise%2C_Winter_2014.JPG"),
    ("Gabrovo", "https://upload.wikimedia.org/wikipedia/commons/thumb/c/c0/TownHall_Gabrovo.jpg/1280px-TownHall_Gabrovo.jpg"),
    ("Haskovo", "https://upload.wikimedia.org/wikipedia/commons/thumb/0/01/Haskovo2.jpg/1024px-Haskovo2.jpg"),
    ("Kardzhali", "https://upload.wikimedia.org/wikipedia/commons/5/5d/%D0%98%D1%81%D1%82%D0%BE%D1%80%D0%B8%D1%87%D0%B5%D1%81%D0%BA%D0%B8%D1%8F%D1%82_%D0%BC%D1%83%D0%B7%D0%B5%D0%B9_%D0%B2_%D0%9A%D1%8A%D1%80%D0%B4%D0%B6%D0%B0%D0%BB%D0%B8.JPG"),
    ("Kyustendil", "https://upload.wikimedia.org/wikipedia/commons/thumb/0/09/Kyustendil_25.jpg/1024px-Kyustendil_25.jpg"),
    ("Lovech", "https://upload.wikimedia.org/wikipedia/commons/thumb/3/3b/Bulgaria-Lovech-03.jpg/1024px-Bulgaria-Lovech-03.jpg"),
    ("Montana", "https://upload.wikimedia.org/wikipedia/commons/4/47/Montana-downtown.jpg"),
    ("Pazardzhik", "https://upload.wikimedia.org/wikipedia/commons/thumb/8/88/Pazardzhik_City_Centre.jpg/1024px-Pazardzhik_City_Centre.jpg"),
    ("Pernik", "https://upload.wikimedia.org/wikipedia/commons/thumb/e/ec/Pernik-culture-palace-left.jpg/1920px-Pernik-culture-palace-left.jpg"),
    ("Pleven", "https://upload.wikimedia.org/wikipedia/commons/thumb/9/91/%D0%9F%D0%BB%D0%B5%D0%B2%D0%B5%D0%BD_%D0%BC%D0%B0%D1%80%D1%82_2014_-_panoramio_%281%29.jpg/1280px-%D0%9F%D0%BB%D0%B5%D0%B2%D0%B5%D0%BD_%D0%BC%D0%B0%D1%80%D1%82_2014_-_panoramio_%281%29.jpg"),
    ("Plovdiv", "https://upload.wikimedia.org/wikipedia/commons/thumb/0/0c/Bulgaria_Bulgaria-0785_-_Roman_Theatre_of_Philippopolis_%287432772486%29.jpg/1280px-Bulgaria_Bulgaria-0785_-_Roman_Theatre_of_Philippopolis_%287432772486%29.jpg"),
    ("Razgrad", "https://upload.wikimedia.org/wikipedia/commons/thumb/d/d4/%D0%95%D1%82%D0%BD%D0%BE%D0%B3%D1%80%D0%B0%D1%84%D1%81%D0%BA%D0%B8_%D0%BC%D1%83%D0%B7%D0%B5%D0%B9_%D0%B2_%D0%B3%D1%80%D0%B0%D0%B4_%D0%A0%D0%B0%D0%B7%D0%B3%D1%80%D0%B0%D0%B4.jpg/1280px-%D0%95%D1%82%D0%BD%D0%BE%D0%B3%D1%80%D0%B0%D1%84%D1%81%D0%BA%D0%B8_%D0%BC%D1%83%D0%B7%D0%B5%D0%B9_%D0%B2_%D0%B3%D1%80%D0%B0%D0%B4_%D0%A0%D0%B0%D0%B7%D0%B3%D1%80%D0%B0%D0%B4.jpg"),
    ("Ruse", "https://upload.wikimedia.org/wikipedia/commons/thumb/3/39/%D0%9E%D0%BF%D0%B5%D1%80%D0%B0%D1%82%D0%B0_%D0%B2_%D0%A0%D1%83%D1%81%D0%B5.jpg/1280px-%D0%9E%D0%BF%D0%B5%D1%80%D0%B0%D1%82%D0%B0_%D0%B2_%D0%A0%D1%83%D1%81%D0%B5.jpg"),
    ("Shumen", "https://upload.wikimedia.org/wikipedia/commons/5/51/Shumen_chitalishte_Dobri_Voynikov.jpg"),
    ("Silistra", "https://upload.wikimedia.org/wikipedia/commons/thumb/c/c9/Silistra-art-gallery-Minkov.jpg/1024px-Silistra-art-gallery-Minkov.jpg"),
    ("Sliven", "https://upload.wikimedia.org/wikipedia/commons/thumb/9/99/Municipality_of_Sliven_Photo.jpg/1280px-Municipality_of_Sliven_Photo.jpg"),
    ("Smolyan", "https://upload.wikimedia.org/wikipedia/commons/thumb/e/e0/%D0%A1%D0%BC%D0%BE%D0%BB%D1%8F%D0%BD_2691396959_f63b323fab_o.jpg/1024px-%D0%A1%D0%BC%D0%BE%D0%BB%D1%8F%D0%BD_2691396959_f63b323fab_o.jpg"),
    ("Sofia", "https://upload.wikimedia.org/wikipedia/commons/thumb/c/c0/Catedral_de_Alejandro_Nevski_--_2019_--_Sof%C3%ADa%2C_Bulgaria.jpg/1280px-Catedral_de_Alejandro_Nevski_--_2019_--_Sof%C3%ADa%2C_Bulgaria.jpg"),
    ("Stara Zagora", "https://upload.wikimedia.org/wikipedia/commons/3/33/Samarsko_Zname_Panorama.jpg"),
    ("Targovishte", "https://upload.wikimedia.org/wikipedia/commons/thumb/5/5c/Targovishte-MainSquare.jpg/1280px-Targovishte-MainSquare.jpg"),
    ("Varna", "https://upload.wikimedia.org/wikipedia/en/thumb/7/79/Dramatheatrevarna.jpg/1280px-Dramatheatrevarna.jpg"),
    ("Veliko Tarnovo", "https://traventuria.com/wp-content/uploads/2016/10/veliko-tarnovo-1.jpg"),
    ("Vidin", "https://upload.wikimedia.org/wikipedia/commons/7/70/Theater_House_in_Vidin_%2827460729905%29.jpg"),
    ("Vratsa", "https://upload.wikimedia.org/wikipedia/commons/thumb/a/a4/Vratsa_12.jpg/1024px-Vratsa_12.jpg"),
    ("Yambol", "https://upload.wikimedia.org/wikipedia/commons/thumb/9/9d/YAMBOL_new_center.jpg/1920px-YAMBOL_new_center.jpg"),
];

struct SeedSuggestion {
    title: &'static str,
    category: &'static str,
    description: &'static str,
    attachment_url: &'static str,
    status: &'static str,
    priority: &'static str,
    city: &'static str,
}

const SUGGESTIONS: &[SeedSuggestion] = &[
    SeedSuggestion {
        title: "Improve Public Transport",
        category: "Transport",
        description: "Implement more frequent bus routes during peak hours to reduce congestion.",
        attachment_url: "https://sofiacheap.com/p/a/v/avtobus-sofia-28-1140x0.jpg.pagespeed.ce._682L6k5Ui.jpg",
        status: "Pending",
        priority: "High",
        city: "Sofia",
    },
    SeedSuggestion {
        title: "Park Renovation",
        category: "Environment",
        description: "Renovate the central park by adding new benches, lighting, and a playground area.",
        attachment_url: "https://images.adsttc.com/media/images/65ef/ba05/4ad7/6901/7c36/0da6/slideshow/renovation-of-peace-parks-gate-6-atelier-z-plus_14.jpg?1710209562",
        status: "Approved",
        priority: "Medium",
        city: "Plovdiv",
    },
    SeedSuggestion {
        title: "Recycling Initiative",
        category: "Waste Management",
        description: "Introduce a recycling program and provide more public recycling bins.",
        attachment_url: "https://cleanlites.com/wp-content/uploads/2020/01/011420_Cleanlites-Blog-Image_Encourage-Recycling-Community.jpg",
        status: "In Review",
        priority: "High",
        city: "Varna",
    },
    SeedSuggestion {
        title: "Street Lighting Upgrade",
        category: "Infrastructure",
        description: "Upgrade street lighting in residential areas to improve safety during nighttime.",
        attachment_url: "https://www.silabs.com/content/dam/siliconlabs/images/applications/smart-cities/street-lighting-poster.png",
        status: "Pending",
        priority: "Medium",
        city: "Burgas",
    },
    SeedSuggestion {
        title: "Community Wi-Fi Access",
        category: "Technology",
        description: "Install free Wi-Fi hotspots in key public areas for better community connectivity.",
        attachment_url: "https://www-res.cablelabs.com/wp-content/uploads/2016/10/28093617/Community_Wi-Fi_A_Primer_vivek_ganti-1024x576.jpg",
        status: "Approved",
        priority: "High",
        city: "Ruse",
    },
];

/// What a seeding run inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub locations: usize,
    pub suggestions: usize,
}

/// Inserts the default locations and suggestions into empty tables.
pub async fn seed_defaults(uow: &UnitOfWork) -> Result<SeedReport, RepositoryError> {
    let timer = QueryTimer::new("seed_defaults");
    let tx = uow.begin().await?;
    let mut report = SeedReport::default();

    let locations = tx.repository::<LocationEntity>();
    if locations.count(Filter::all()).await? == 0 {
        for (city, picture) in CITIES {
            locations
                .add(&LocationEntity {
                    id: Uuid::new_v4(),
                    city_name: city.to_string(),
                    street_name: DEFAULT_STREET.to_string(),
                    city_picture: Some(picture.to_string()),
                })
                .await?;
            report.locations += 1;
        }
    }

    let suggestions = tx.repository::<SuggestionEntity>();
    if suggestions.count(Filter::all()).await? == 0 {
        let links = tx.repository::<SuggestionLocationEntity>();
        for seed in SUGGESTIONS {
            let suggestion = SuggestionEntity {
                id: Uuid::new_v4(),
                title: seed.title.to_string(),
                category: seed.category.to_string(),
                description: seed.description.to_string(),
                status: seed.status.to_string(),
                priority: seed.priority.to_string(),
                uploaded_on: Utc::now(),
                attachment_url: Some(seed.attachment_url.to_string()),
                latitude: None,
                longitude: None,
            };
            suggestions.add(&suggestion).await?;

            let location = locations
                .query()
                .filter(Filter::eq("city_name", seed.city))
                .first()
                .await?;
            if let Some(location) = location {
                links
                    .add(&SuggestionLocationEntity {
                        suggestion_id: suggestion.id,
                        location_id: location.id,
                    })
                    .await?;
            }
            report.suggestions += 1;
        }
    }

    tx.commit().await?;
    timer.record();

    if report != SeedReport::default() {
        info!(
            locations = report.locations,
            suggestions = report.suggestions,
            "Seeded default data"
        );
    }
    Ok(report)
}
