use chrono::{Duration, Utc};

use crate::{
    db_types::{Event, EventType, MinorUnits, NewEvent, NewOrganization, Organization, OrganizationType},
    traits::DirectoryManagement,
};

pub async fn new_organization<B: DirectoryManagement>(db: &B, name: &str, org_type: OrganizationType) -> Organization {
    db.insert_organization(NewOrganization::new(name, org_type)).await.expect("Error creating organization")
}

/// A crowdfunding event running for the next 30 days with the given target in major units.
pub async fn new_fundraiser<B: DirectoryManagement>(db: &B, org_id: i64, title: &str, target_major: i64) -> Event {
    let start = Utc::now();
    let event = NewEvent::new(org_id, EventType::Crowdfunding, title, start)
        .with_end_date(start + Duration::days(30))
        .with_target(MinorUnits::from_major(target_major));
    db.insert_event(event).await.expect("Error creating event")
}

pub async fn new_general_event<B: DirectoryManagement>(db: &B, org_id: i64, title: &str) -> Event {
    let start = Utc::now();
    let event = NewEvent::new(org_id, EventType::General, title, start).with_end_date(start + Duration::days(1));
    db.insert_event(event).await.expect("Error creating event")
}
