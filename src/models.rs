use serde::Serialize;

// Reconcilable Discogs entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Master,
    Release,
    Artist,
}

impl EntityType {
    // Order matches the metadata document
    pub const ENABLED: [EntityType; 3] = [EntityType::Master, EntityType::Release, EntityType::Artist];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ENABLED.into_iter().find(|kind| kind.id() == id)
    }

    pub fn id(self) -> &'static str {
        match self {
            EntityType::Master => "/discogs/master",
            EntityType::Release => "/discogs/release",
            EntityType::Artist => "/discogs/artist",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityType::Master => "Master",
            EntityType::Release => "Release",
            EntityType::Artist => "Artist",
        }
    }

    // Last segment of the id, used both as search `type=` and in URIs
    pub fn slug(self) -> &'static str {
        self.id().rsplit('/').next().unwrap_or_default()
    }

    // Result fields holding the display name, first hit wins
    pub fn name_fields(self) -> &'static [&'static str] {
        match self {
            EntityType::Artist => &["title", "name"],
            EntityType::Master | EntityType::Release => &["title"],
        }
    }

    pub fn descriptor(self) -> EntityTypeDescriptor {
        EntityTypeDescriptor {
            id: self.id(),
            name: self.name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityTypeDescriptor {
    pub id: &'static str,
    pub name: &'static str,
}

// One scored reconciliation candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateMatch {
    pub id: String,
    pub name: String,
    pub score: u8,
    #[serde(rename = "match")]
    pub is_exact_match: bool,
    #[serde(rename = "type")]
    pub types: Vec<EntityTypeDescriptor>,
    #[serde(rename = "catno")]
    pub catalog_number: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceMetadata {
    pub name: &'static str,
    #[serde(rename = "identifierSpace")]
    pub identifier_space: &'static str,
    #[serde(rename = "schemaSpace")]
    pub schema_space: &'static str,
    #[serde(rename = "defaultTypes")]
    pub default_types: Vec<EntityTypeDescriptor>,
    pub view: ViewTemplate,
    pub preview: PreviewTemplate,
}

#[derive(Debug, Serialize)]
pub struct ViewTemplate {
    pub url: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PreviewTemplate {
    pub url: &'static str,
    pub width: u32,
    pub height: u32,
}

pub fn service_metadata() -> ServiceMetadata {
    ServiceMetadata {
        name: "Discogs Reconciliation Service",
        identifier_space: "http://www.discogs.com/",
        schema_space: "http://www.schema.org/",
        default_types: EntityType::ENABLED.iter().map(|kind| kind.descriptor()).collect(),
        view: ViewTemplate { url: "{{id}}" },
        preview: PreviewTemplate {
            url: "{{id}}/preview",
            width: 400,
            height: 300,
        },
    }
}
