//! User Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::value_objects::Email;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    #[serde(skip)]
    pub credential: Credential,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub role: Role,
    pub wishlist: Vec<Uuid>,
    pub addresses: Vec<SavedAddress>,
    pub created_at: DateTime<Utc>,
}

/// How the user signs in. Exactly one is held per account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    Password { hash: String },
    Google { subject: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Customer => "customer", Self::Seller => "seller" }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
    type Err = UserError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            other => Err(UserError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub is_default: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressInput {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub is_default: bool,
}

/// Profile asserted by a verified Google id token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoogleProfile {
    pub subject: String,
    pub email: Email,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl User {
    pub fn with_password(email: Email, hash: String, name: Option<String>, now: DateTime<Utc>) -> Self {
        Self::new(email, Credential::Password { hash }, name, None, now)
    }

    pub fn from_google(profile: GoogleProfile, now: DateTime<Utc>) -> Self {
        Self::new(profile.email, Credential::Google { subject: profile.subject }, profile.name, profile.picture, now)
    }

    fn new(email: Email, credential: Credential, name: Option<String>, picture: Option<String>, now: DateTime<Utc>) -> Self {
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Self {
            id: Uuid::now_v7(), email, credential, name, picture, role: Role::Customer,
            wishlist: vec![], addresses: vec![], created_at: now,
        }
    }

    pub fn is_seller(&self) -> bool { self.role == Role::Seller }

    pub fn password_hash(&self) -> Option<&str> {
        match &self.credential { Credential::Password { hash } => Some(hash), Credential::Google { .. } => None }
    }

    pub fn google_subject(&self) -> Option<&str> {
        match &self.credential { Credential::Google { subject } => Some(subject), Credential::Password { .. } => None }
    }

    /// Refreshes the picture from a newer Google profile. Returns whether anything changed.
    pub fn refresh_picture(&mut self, picture: Option<String>) -> bool {
        match picture {
            Some(p) if self.picture.as_deref() != Some(p.as_str()) => { self.picture = Some(p); true }
            _ => false,
        }
    }

    /// Adds or removes `product_id`. Returns whether it is wishlisted afterwards.
    pub fn toggle_wishlist(&mut self, product_id: Uuid) -> bool {
        if let Some(pos) = self.wishlist.iter().position(|p| *p == product_id) {
            self.wishlist.remove(pos);
            false
        } else {
            self.wishlist.push(product_id);
            true
        }
    }

    /// At most one address is default. A new default clears the others and the
    /// first address saved becomes default on its own.
    pub fn add_address(&mut self, input: AddressInput) -> &SavedAddress {
        let is_default = input.is_default || self.addresses.is_empty();
        if is_default {
            self.addresses.iter_mut().for_each(|a| a.is_default = false);
        }
        self.addresses.push(SavedAddress {
            id: Uuid::now_v7(), first_name: input.first_name, last_name: input.last_name, address: input.address,
            city: input.city, state: input.state, zip: input.zip, is_default,
        });
        &self.addresses[self.addresses.len() - 1]
    }

    pub fn remove_address(&mut self, address_id: Uuid) -> Result<(), UserError> {
        let pos = self.addresses.iter().position(|a| a.id == address_id).ok_or(UserError::AddressNotFound)?;
        let removed = self.addresses.remove(pos);
        if removed.is_default {
            if let Some(first) = self.addresses.first_mut() { first.is_default = true; }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Address not found")]
    AddressNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::with_password(Email::new("ada@example.com").unwrap(), "hash".into(), Some(" Ada ".into()), Utc::now())
    }

    fn defaults(u: &User) -> usize { u.addresses.iter().filter(|a| a.is_default).count() }

    #[test]
    fn test_new_user_is_customer() {
        let u = user();
        assert_eq!(u.role, Role::Customer);
        assert_eq!(u.name.as_deref(), Some("Ada"));
        assert_eq!(u.password_hash(), Some("hash"));
        assert!(u.google_subject().is_none());
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("credential").is_none());
    }

    #[test]
    fn test_wishlist_toggle() {
        let mut u = user();
        let p = Uuid::new_v4();
        assert!(u.toggle_wishlist(p));
        assert!(!u.toggle_wishlist(p));
        assert!(u.wishlist.is_empty());
    }

    #[test]
    fn test_single_default_address() {
        let mut u = user();
        let first = u.add_address(AddressInput { city: "Pune".into(), ..Default::default() }).id;
        assert!(u.addresses[0].is_default);
        let second = u.add_address(AddressInput { city: "Goa".into(), is_default: true, ..Default::default() }).id;
        u.add_address(AddressInput::default());
        assert_eq!(defaults(&u), 1);
        assert!(u.addresses.iter().find(|a| a.id == second).unwrap().is_default);
        u.remove_address(second).unwrap();
        assert_eq!(defaults(&u), 1);
        assert!(u.addresses[0].is_default);
        u.remove_address(first).unwrap();
        assert_eq!(u.remove_address(first), Err(UserError::AddressNotFound));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("seller".parse::<Role>(), Ok(Role::Seller));
        assert_eq!("admin".parse::<Role>(), Err(UserError::InvalidRole("admin".into())));
    }
}
