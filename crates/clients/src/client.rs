use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use medisupply_core::{ClientId, DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub nombre: String,
    /// Digits only; unique across clients.
    pub nit: String,
    pub direccion: String,
    pub nombre_contacto: String,
    pub telefono_contacto: String,
    pub email_contacto: String,
    pub is_validated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewClient {
    pub nombre: String,
    pub nit: String,
    pub direccion: String,
    pub nombre_contacto: String,
    pub telefono_contacto: String,
    pub email_contacto: String,
}

/// Partial update. The NIT cannot be changed once registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientPatch {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub nombre_contacto: Option<String>,
    #[serde(default)]
    pub telefono_contacto: Option<String>,
    #[serde(default)]
    pub email_contacto: Option<String>,
}

fn bounded(field: &str, value: &str, min: usize, max: usize) -> DomainResult<String> {
    let value = value.trim();
    let len = value.chars().count();
    if len < min || len > max {
        return Err(DomainError::validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Strip spaces and hyphens; what is left must be 5 to 15 digits.
pub fn normalize_nit(raw: &str) -> DomainResult<String> {
    let nit: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    if !(5..=15).contains(&nit.len()) || !nit.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation("nit must contain between 5 and 15 digits"));
    }
    Ok(nit)
}

fn normalize_phone(raw: &str) -> DomainResult<String> {
    let phone: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    let digits = phone.strip_prefix('+').unwrap_or(&phone);
    if !(7..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(
            "telefono_contacto must contain between 7 and 15 digits",
        ));
    }
    Ok(phone)
}

fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim();
    if !email.validate_email() {
        return Err(DomainError::validation("email_contacto is not a valid email address"));
    }
    Ok(email.to_string())
}

impl Client {
    pub fn register(id: ClientId, input: NewClient, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id,
            nombre: bounded("nombre", &input.nombre, 2, 255)?,
            nit: normalize_nit(&input.nit)?,
            direccion: bounded("direccion", &input.direccion, 10, 500)?,
            nombre_contacto: bounded("nombre_contacto", &input.nombre_contacto, 2, 255)?,
            telefono_contacto: normalize_phone(&input.telefono_contacto)?,
            email_contacto: normalize_email(&input.email_contacto)?,
            is_validated: false,
            created_at: now,
            updated_at: None,
        })
    }

    /// Apply a partial update. Every field is checked before anything changes.
    pub fn apply(&mut self, patch: ClientPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let nombre = patch.nombre.as_deref().map(|v| bounded("nombre", v, 2, 255)).transpose()?;
        let direccion = patch
            .direccion
            .as_deref()
            .map(|v| bounded("direccion", v, 10, 500))
            .transpose()?;
        let contacto = patch
            .nombre_contacto
            .as_deref()
            .map(|v| bounded("nombre_contacto", v, 2, 255))
            .transpose()?;
        let telefono = patch.telefono_contacto.as_deref().map(normalize_phone).transpose()?;
        let email = patch.email_contacto.as_deref().map(normalize_email).transpose()?;

        if let Some(v) = nombre {
            self.nombre = v;
        }
        if let Some(v) = direccion {
            self.direccion = v;
        }
        if let Some(v) = contacto {
            self.nombre_contacto = v;
        }
        if let Some(v) = telefono {
            self.telefono_contacto = v;
        }
        if let Some(v) = email {
            self.email_contacto = v;
        }
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn mark_validated(&mut self, now: DateTime<Utc>) {
        self.is_validated = true;
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_client() -> NewClient {
        NewClient {
            nombre: "Clinica Central".to_string(),
            nit: "900-123 456".to_string(),
            direccion: "Calle 10 # 20-30, Bogota".to_string(),
            nombre_contacto: "Laura Gomez".to_string(),
            telefono_contacto: "+57 (601) 555-1234".to_string(),
            email_contacto: "compras@clinica.co".to_string(),
        }
    }

    #[test]
    fn register_normalizes_nit_and_phone() {
        let client = Client::register(ClientId::new(1), new_client(), Utc::now()).unwrap();
        assert_eq!(client.nit, "900123456");
        assert_eq!(client.telefono_contacto, "+576015551234");
        assert!(!client.is_validated);
        assert_eq!(client.updated_at, None);
    }

    #[test]
    fn register_rejects_bad_fields() {
        let cases: [fn(&mut NewClient); 5] = [
            |c| c.nombre = "X".to_string(),
            |c| c.nit = "12AB5".to_string(),
            |c| c.direccion = "short".to_string(),
            |c| c.telefono_contacto = "123".to_string(),
            |c| c.email_contacto = "not-an-email".to_string(),
        ];
        for spoil in cases {
            let mut input = new_client();
            spoil(&mut input);
            assert!(matches!(
                Client::register(ClientId::new(1), input, Utc::now()),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn invalid_patch_leaves_client_untouched() {
        let mut client = Client::register(ClientId::new(1), new_client(), Utc::now()).unwrap();
        let before = client.clone();

        let err = client.apply(
            ClientPatch {
                nombre: Some("Clinica Norte".to_string()),
                email_contacto: Some("broken".to_string()),
                ..ClientPatch::default()
            },
            Utc::now(),
        );
        assert!(err.is_err());
        assert_eq!(client, before);

        client
            .apply(ClientPatch { nombre: Some("Clinica Norte".to_string()), ..ClientPatch::default() }, Utc::now())
            .unwrap();
        assert_eq!(client.nombre, "Clinica Norte");
        assert!(client.updated_at.is_some());
    }

    #[test]
    fn mark_validated_sets_flag() {
        let mut client = Client::register(ClientId::new(1), new_client(), Utc::now()).unwrap();
        client.mark_validated(Utc::now());
        assert!(client.is_validated);
    }

    proptest! {
        /// Separators never matter: the same digits give the same NIT.
        #[test]
        fn nit_ignores_separators(digits in "[0-9]{5,15}", dashes in prop::collection::vec(0usize..15, 0..4)) {
            let mut raw = digits.clone();
            for pos in dashes {
                let at = pos.min(raw.len());
                raw.insert(at, '-');
            }
            prop_assert_eq!(normalize_nit(&raw).unwrap(), digits);
        }
    }
}
