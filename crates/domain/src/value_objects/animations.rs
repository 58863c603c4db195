use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One slide of a code animation. Slides are stored as a JSONB array on the
/// animation row; transitions between consecutive slides are computed
/// client-side at playback time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnimationSlide {
    pub code: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnimationModel {
    pub title: String,
    pub slides: Vec<AnimationSlide>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAnimationModel {
    pub title: Option<String>,
    pub slides: Option<Vec<AnimationSlide>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnimationDto {
    pub id: Uuid,
    pub title: String,
    pub slides: Vec<AnimationSlide>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
