pub mod dignities;
pub mod rulers;
pub mod zodiac;

pub use dignities::{classify_dignity, dignity_score, planet_dignities, DignityType, PlanetDignities};
pub use rulers::{get_sign_ruler, get_sign_ruler_from_longitude, is_chart_ruler};
pub use zodiac::{Element, Modality, Planet, ZodiacSign};
