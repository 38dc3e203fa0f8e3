//! Zone resolution
//!
//! Maps a `(view, zone)` pair to the predicate selecting its fields and the
//! order attribute sorting them, and enumerates the zones of each view:
//!
//! | view   | zones                                             | sort key       |
//! |--------|---------------------------------------------------|----------------|
//! | form   | the template's steps                              | `form.order`   |
//! | detail | header, main, sidebar                             | `detail.order` |
//! | card   | the six card regions, plus `hidden`               | `card.order`   |
//!
//! `hidden` holds every field with `card.visible == false`, in canonical
//! model order. It has no order attribute of its own.

use crate::error::{LayoutError, Result};
use crate::model::LayoutModel;
use crate::types::{CardZone, DetailSection, Field, StepId, ViewMode};
use std::fmt;

/// Name of the virtual card zone holding fields that are not on the card
pub const HIDDEN_ZONE: &str = "hidden";

/// A bucket of fields within one view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneId {
    Step(StepId),
    Section(DetailSection),
    Card(CardZone),
    Hidden,
}

impl ZoneId {
    /// The view this zone belongs to
    pub fn view(&self) -> ViewMode {
        match self {
            ZoneId::Step(_) => ViewMode::Form,
            ZoneId::Section(_) => ViewMode::Detail,
            ZoneId::Card(_) | ZoneId::Hidden => ViewMode::Card,
        }
    }

    /// Whether members carry a contiguous order attribute
    pub fn is_ordered(&self) -> bool {
        !matches!(self, ZoneId::Hidden)
    }

    /// Zone membership predicate
    pub fn contains(&self, field: &Field) -> bool {
        match self {
            ZoneId::Step(step_id) => &field.form.step_id == step_id,
            ZoneId::Section(section) => field.detail.section == *section,
            ZoneId::Card(zone) => field.card.visible && field.card.zone == *zone,
            ZoneId::Hidden => !field.card.visible,
        }
    }

    /// Order attribute of a member, `None` for `hidden`
    pub fn sort_key(&self, field: &Field) -> Option<u32> {
        match self {
            ZoneId::Step(_) => Some(field.form.order),
            ZoneId::Section(_) => Some(field.detail.order),
            ZoneId::Card(_) => Some(field.card.order),
            ZoneId::Hidden => None,
        }
    }

    /// The zone a field currently occupies in a view
    pub fn of(view: ViewMode, field: &Field) -> Self {
        match view {
            ViewMode::Form => ZoneId::Step(field.form.step_id.clone()),
            ViewMode::Detail => ZoneId::Section(field.detail.section),
            ViewMode::Card if field.card.visible => ZoneId::Card(field.card.zone),
            ViewMode::Card => ZoneId::Hidden,
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneId::Step(id) => write!(f, "{}", id),
            ZoneId::Section(section) => f.write_str(section.as_str()),
            ZoneId::Card(zone) => f.write_str(zone.as_str()),
            ZoneId::Hidden => f.write_str(HIDDEN_ZONE),
        }
    }
}

/// Stateless zone lookups over one model
#[derive(Debug, Clone, Copy)]
pub struct ZoneResolver<'a> {
    model: &'a LayoutModel,
}

impl<'a> ZoneResolver<'a> {
    pub fn new(model: &'a LayoutModel) -> Self {
        Self { model }
    }

    /// Every zone of a view, in display order
    pub fn zones(&self, view: ViewMode) -> Vec<ZoneId> {
        match view {
            ViewMode::Form => self
                .model
                .steps()
                .iter()
                .map(|step| ZoneId::Step(step.id.clone()))
                .collect(),
            ViewMode::Detail => DetailSection::ALL
                .into_iter()
                .map(ZoneId::Section)
                .collect(),
            ViewMode::Card => CardZone::ALL
                .into_iter()
                .map(ZoneId::Card)
                .chain(std::iter::once(ZoneId::Hidden))
                .collect(),
        }
    }

    /// Parse a zone id as sent by the UI
    pub fn parse(&self, view: ViewMode, raw: &str) -> Result<ZoneId> {
        let zone = match view {
            ViewMode::Form => {
                let id = StepId::from_string(raw);
                self.model.step(&id).map(|_| ZoneId::Step(id))
            }
            ViewMode::Detail => DetailSection::parse(raw).map(ZoneId::Section),
            ViewMode::Card if raw == HIDDEN_ZONE => Some(ZoneId::Hidden),
            ViewMode::Card => CardZone::parse(raw).map(ZoneId::Card),
        };
        zone.ok_or_else(|| LayoutError::unknown_zone(view, raw))
    }

    /// Check that a typed zone is valid for a view in this model
    pub fn validate(&self, view: ViewMode, zone: &ZoneId) -> Result<()> {
        let valid = zone.view() == view
            && match zone {
                ZoneId::Step(id) => self.model.step(id).is_some(),
                _ => true,
            };
        if valid {
            Ok(())
        } else {
            Err(LayoutError::unknown_zone(view, zone.to_string()))
        }
    }

    /// Members of a zone, sorted by the zone's order attribute.
    ///
    /// The sort is stable, so ties fall back to canonical model order.
    pub fn members(&self, zone: &ZoneId) -> Vec<&'a Field> {
        let mut members: Vec<&Field> = self
            .model
            .fields()
            .iter()
            .filter(|field| zone.contains(field))
            .collect();
        if zone.is_ordered() {
            members.sort_by_key(|field| zone.sort_key(field));
        }
        members
    }
}
