//! Workshop venue derived from an existing studio location.
//!
//! The derivation is a copy taken at selection time. Later edits to the
//! studio do not flow into a workshop that was already associated with it.

use shared::{
    domain::LocationId,
    protocol::{Geolocation, LocationSummary},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueType {
    /// Held at a studio the creator already registered.
    AssociatedLocation,
    Independent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueAddress {
    pub building: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub landmark: String,
    pub map_address: String,
    /// `"lat,lng"`, empty when unknown.
    pub geolocation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedVenue {
    pub location_id: LocationId,
    pub association: String,
    pub address: VenueAddress,
}

pub fn derive_venue(location: &LocationSummary) -> DerivedVenue {
    DerivedVenue {
        location_id: location.id.clone(),
        association: format!("{}-{}", location.id, location.studio_name),
        address: VenueAddress {
            building: location.building_name.clone(),
            street: location.street.clone(),
            city: location.city.clone(),
            state: location.state.clone(),
            landmark: location.landmark.clone(),
            map_address: location.map_address.clone(),
            geolocation: location
                .geolocation
                .map(format_geolocation)
                .unwrap_or_default(),
        },
    }
}

pub fn format_geolocation(point: Geolocation) -> String {
    format!("{},{}", point.lat, point.lng)
}

/// Location id encoded in an association label (`"{id}-{studio name}"`).
pub fn location_id_from_association(label: &str) -> Option<LocationId> {
    let id = label.split('-').next()?.trim();
    if id.is_empty() {
        None
    } else {
        Some(LocationId::new(id))
    }
}
