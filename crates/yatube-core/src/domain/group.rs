use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Longest accepted group title.
pub const TITLE_MAX_LENGTH: usize = 200;
/// Longest accepted slug.
pub const SLUG_MAX_LENGTH: usize = 50;

/// Group entity - a named category posts can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    pub fn new(title: String, slug: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            description,
        }
    }

    /// Check field limits before the group reaches the store.
    /// Slug uniqueness is left to the store.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title: required".to_string()));
        }
        if self.title.chars().count() > TITLE_MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "title: at most {TITLE_MAX_LENGTH} characters"
            )));
        }
        if self.slug.is_empty() || self.slug.chars().count() > SLUG_MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "slug: 1 to {SLUG_MAX_LENGTH} characters"
            )));
        }
        if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::Validation(
                "slug: only letters, digits, hyphens and underscores".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sh",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/// Build a slug from a title: lowercase, Cyrillic transliterated,
/// runs of other characters collapsed into one hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        let piece = if c.is_ascii_alphanumeric() || c == '_' {
            Some(c.to_string())
        } else {
            transliterate(c).map(str::to_string)
        };

        match piece {
            Some(piece) if piece.is_empty() => {}
            Some(piece) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push_str(&piece);
            }
            None => pending_dash = true,
        }

        if slug.len() >= SLUG_MAX_LENGTH {
            break;
        }
    }

    slug.truncate(SLUG_MAX_LENGTH);
    slug.trim_end_matches('-').to_string()
}
