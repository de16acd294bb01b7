use super::queries;
use crate::lifecycle::domain::{
    BuildEvent, BuildEventId, BuildStatus, BuildTransition, CveDescriptor, CveFinding, Image,
    ImageId, NewImage, SbomDescriptor, SbomRecord,
};
use crate::ports::outbound::{CompletionUnit, StoreResult, TransitionOutcome};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// CompletionUnit backed by a connection with an open `BEGIN IMMEDIATE` transaction
pub(super) struct SqliteCompletionUnit<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCompletionUnit<'a> {
    pub(super) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl CompletionUnit for SqliteCompletionUnit<'_> {
    fn find_build_event(&mut self, id: BuildEventId) -> StoreResult<Option<BuildEvent>> {
        queries::find_build_event(self.conn, id)
    }

    fn insert_image(&mut self, image: &NewImage, now: DateTime<Utc>) -> StoreResult<Image> {
        queries::insert_image(self.conn, image, now)
    }

    fn insert_sbom_records(
        &mut self,
        image_id: ImageId,
        sboms: &[SbomDescriptor],
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<SbomRecord>> {
        queries::insert_sbom_records(self.conn, image_id, sboms, now)
    }

    fn insert_cve_findings(
        &mut self,
        image_id: ImageId,
        cves: &[CveDescriptor],
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<CveFinding>> {
        queries::insert_cve_findings(self.conn, image_id, cves, now)
    }

    fn transition_build_event(
        &mut self,
        id: BuildEventId,
        expected: BuildStatus,
        transition: BuildTransition,
        now: DateTime<Utc>,
    ) -> StoreResult<TransitionOutcome> {
        queries::transition_build_event(self.conn, id, expected, transition, now)
    }
}
