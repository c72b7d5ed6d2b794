//! Owner/type projection over materials. Pure; never persisted.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use lectern_core::models::{Material, MaterialSource, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerFilter {
    #[default]
    All,
    /// Only materials owned by the current user
    Mine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Uploaded,
    Generated,
}

impl OwnerFilter {
    fn matches(&self, material: &Material, current_user: Option<UserId>) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Mine => current_user == Some(material.owner_id),
        }
    }
}

impl TypeFilter {
    fn matches(&self, material: &Material) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Uploaded => material.source == MaterialSource::Upload,
            TypeFilter::Generated => material.source == MaterialSource::Generated,
        }
    }
}

impl FromStr for OwnerFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(OwnerFilter::All),
            "mine" => Ok(OwnerFilter::Mine),
            _ => Err(anyhow::anyhow!(
                "Invalid owner filter: {} (expected all or mine)",
                s
            )),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "uploaded" => Ok(TypeFilter::Uploaded),
            "generated" => Ok(TypeFilter::Generated),
            _ => Err(anyhow::anyhow!(
                "Invalid type filter: {} (expected all, uploaded or generated)",
                s
            )),
        }
    }
}

impl Display for OwnerFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OwnerFilter::All => write!(f, "all"),
            OwnerFilter::Mine => write!(f, "mine"),
        }
    }
}

impl Display for TypeFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TypeFilter::All => write!(f, "all"),
            TypeFilter::Uploaded => write!(f, "uploaded"),
            TypeFilter::Generated => write!(f, "generated"),
        }
    }
}

/// Both filters together; they compose by logical AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialFilter {
    pub owner: OwnerFilter,
    pub kind: TypeFilter,
}

impl MaterialFilter {
    pub fn new(owner: OwnerFilter, kind: TypeFilter) -> Self {
        Self { owner, kind }
    }

    pub fn matches(&self, material: &Material, current_user: Option<UserId>) -> bool {
        self.owner.matches(material, current_user) && self.kind.matches(material)
    }

    /// Keep matching materials in their input order. With no current user,
    /// `mine` matches nothing.
    pub fn apply<'a, I>(&self, materials: I, current_user: Option<UserId>) -> Vec<&'a Material>
    where
        I: IntoIterator<Item = &'a Material>,
    {
        materials
            .into_iter()
            .filter(|m| self.matches(m, current_user))
            .collect()
    }
}
