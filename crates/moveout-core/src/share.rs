//! Expiring share links
//!
//! A share link is an unguessable token (a random UUID, 122 bits) mapped to
//! an inspection and stamped onto one of its reports. Links are valid up to
//! and including their expiry instant. Accessing a link is a side-effecting
//! read: it sets `accessed` and bumps `access_count`.
//!
//! Every time-dependent operation has an `_at` variant taking `now`.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{InspectionStatus, Report, ShareLink, ShareLinkInfo};
use crate::report::{generate_and_store_at, ReportError};
use crate::storage::StorageError;
use crate::store::Store;

/// Errors from share operations
#[derive(Error, Debug)]
pub enum ShareError {
    /// Unknown and expired tokens are deliberately indistinguishable
    #[error("Share link is expired or does not exist")]
    ExpiredOrMissing,

    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),

    #[error("Report {report_id} does not belong to inspection {inspection_id}")]
    ReportMismatch { report_id: Uuid, inspection_id: Uuid },

    #[error("Share expiry of {days} days is out of range")]
    ExpiryOutOfRange { days: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Issues, validates and revokes share links against a store
pub struct ShareManager<'a> {
    store: &'a mut Store,
    origin: String,
    expiry: Duration,
}

impl<'a> ShareManager<'a> {
    /// Use the origin and expiry from the store's configuration
    pub fn new(store: &'a mut Store) -> Self {
        let origin = store.config().share_origin.clone();
        let expiry = store.config().share_expiry();
        Self {
            store,
            origin,
            expiry,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// `<origin>/share/<token>`
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/share/{}", self.origin.trim_end_matches('/'), token)
    }

    /// Create a link for a stored report and return its URL
    pub fn create_share_link(
        &mut self,
        inspection_id: Uuid,
        report_id: Uuid,
    ) -> Result<String, ShareError> {
        let link = self.create_share_link_at(inspection_id, report_id, Utc::now())?;
        Ok(self.share_url(&link.token))
    }

    pub fn create_share_link_at(
        &mut self,
        inspection_id: Uuid,
        report_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ShareLink, ShareError> {
        self.store.require_inspection(inspection_id)?;
        let report = self
            .store
            .get_report(report_id)?
            .ok_or(ShareError::ReportNotFound(report_id))?;
        if report.inspection_id != inspection_id {
            return Err(ShareError::ReportMismatch {
                report_id,
                inspection_id,
            });
        }

        let expires_at = now
            .checked_add_signed(self.expiry)
            .ok_or(ShareError::ExpiryOutOfRange {
                days: self.expiry.num_days(),
            })?;

        let link = ShareLink {
            token: Uuid::new_v4().to_string(),
            inspection_id,
            created_at: now,
            expires_at,
            accessed: false,
            access_count: 0,
        };

        self.store.publish_share_link(&link, report_id)?;

        info!(inspection = %inspection_id, report = %report_id, expires_at = %link.expires_at, "Created share link");
        Ok(link)
    }

    /// Validate a token and record the access
    ///
    /// Returns `None` for unknown or expired tokens.
    pub fn access_share_link(&mut self, token: &str) -> Result<Option<ShareLink>, ShareError> {
        self.access_share_link_at(token, Utc::now())
    }

    pub fn access_share_link_at(
        &mut self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareLink>, ShareError> {
        let Some(mut link) = self.store.get_share_link(token)? else {
            debug!("Share token not found");
            return Ok(None);
        };

        if link.is_expired_at(now) {
            debug!(expires_at = %link.expires_at, "Share token expired");
            return Ok(None);
        }

        link.accessed = true;
        link.access_count = link.access_count.saturating_add(1);
        self.store.record_share_access(&link)?;

        debug!(count = link.access_count, "Share link accessed");
        Ok(Some(link))
    }

    /// Access a link and return the report stamped with it
    pub fn get_shared_report(&mut self, token: &str) -> Result<Option<Report>, ShareError> {
        self.get_shared_report_at(token, Utc::now())
    }

    pub fn get_shared_report_at(
        &mut self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Report>, ShareError> {
        let Some(link) = self.access_share_link_at(token, now)? else {
            return Ok(None);
        };

        let report = self
            .store
            .reports_for_inspection(link.inspection_id)?
            .into_iter()
            .find(|report| report.share_token.as_deref() == Some(token));
        Ok(report)
    }

    /// Like [`Self::get_shared_report`] but treats absence as an error
    pub fn open_shared_report(&mut self, token: &str) -> Result<Report, ShareError> {
        self.get_shared_report(token)?
            .ok_or(ShareError::ExpiredOrMissing)
    }

    /// Delete a link and clear its stamp from reports; revoking an unknown
    /// token is not an error
    pub fn revoke_share_link(&mut self, token: &str) -> Result<(), ShareError> {
        let removed = self.store.delete_share_link(token)?;
        let cleared = self.store.clear_report_share(token)?;
        info!(removed, reports_cleared = cleared, "Revoked share link");
        Ok(())
    }

    /// Delete every link whose expiry is at or before now
    pub fn cleanup_expired_shares(&mut self) -> Result<usize, ShareError> {
        self.cleanup_expired_shares_at(Utc::now())
    }

    pub fn cleanup_expired_shares_at(&mut self, now: DateTime<Utc>) -> Result<usize, ShareError> {
        let deleted = self.store.delete_expired_share_links(now)?;
        if deleted > 0 {
            info!(deleted, "Removed expired share links");
        }
        Ok(deleted)
    }

    /// Describe a token without recording an access
    pub fn share_link_info(&self, token: &str) -> Result<ShareLinkInfo, ShareError> {
        self.share_link_info_at(token, Utc::now())
    }

    pub fn share_link_info_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ShareLinkInfo, ShareError> {
        Ok(match self.store.get_share_link(token)? {
            Some(link) => ShareLinkInfo {
                exists: true,
                expired: link.is_expired_at(now),
                access_count: link.access_count,
                expires_at: Some(link.expires_at),
            },
            None => ShareLinkInfo {
                exists: false,
                expired: false,
                access_count: 0,
                expires_at: None,
            },
        })
    }

    /// Publish an inspection: reuse its newest report (or generate one),
    /// create a link, mark the inspection shared and return the URL
    pub fn share_inspection(&mut self, inspection_id: Uuid) -> Result<String, ShareError> {
        let link = self.share_inspection_at(inspection_id, Utc::now())?;
        Ok(self.share_url(&link.token))
    }

    pub fn share_inspection_at(
        &mut self,
        inspection_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ShareLink, ShareError> {
        self.store.require_inspection(inspection_id)?;

        let report = match self.store.latest_report(inspection_id)? {
            Some(report) => report,
            None => generate_and_store_at(self.store, inspection_id, now)?,
        };

        let link = self.create_share_link_at(inspection_id, report.id, now)?;
        self.store
            .set_inspection_status(inspection_id, InspectionStatus::Shared)?;
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{NewInspection, NewReport, NewRoom, RoomType};
    use chrono::{NaiveDate, TimeZone};

    /// Stored timestamps keep millisecond precision
    fn now_ms() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(Utc::now().timestamp_millis()).unwrap()
    }

    fn store() -> Store {
        Store::open_in_memory(Config::default()).unwrap()
    }

    fn inspection_with_report(store: &mut Store) -> (Uuid, Uuid) {
        let inspection = store
            .create_inspection(NewInspection::new(
                "31 Spooner Street",
                NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            ))
            .unwrap();
        let report = store
            .save_report(NewReport {
                inspection_id: inspection.id,
                filename: "inspection-report-1.pdf".to_string(),
                generated_at: Utc::now(),
                data: b"%PDF-1.5".to_vec(),
            })
            .unwrap();
        (inspection.id, report.id)
    }

    #[test]
    fn test_create_returns_url_and_stamps_report() {
        let mut store = store();
        let (inspection_id, report_id) = inspection_with_report(&mut store);

        let url = ShareManager::new(&mut store)
            .with_origin("https://inspect.example.com/")
            .create_share_link(inspection_id, report_id)
            .unwrap();

        let token = url
            .strip_prefix("https://inspect.example.com/share/")
            .unwrap();
        assert!(Uuid::parse_str(token).is_ok());

        let report = store.require_report(report_id).unwrap();
        assert_eq!(report.share_token.as_deref(), Some(token));

        let link = store.get_share_link(token).unwrap().unwrap();
        assert!(!link.accessed);
        assert_eq!(link.access_count, 0);
        assert_eq!(link.expires_at - link.created_at, Duration::days(7));
        assert_eq!(report.share_expires_at, Some(link.expires_at));
    }

    #[test]
    fn test_access_counts_and_expiry() {
        let mut store = store();
        let (inspection_id, report_id) = inspection_with_report(&mut store);
        let mut shares = ShareManager::new(&mut store);
        let now = now_ms();

        let link = shares
            .create_share_link_at(inspection_id, report_id, now)
            .unwrap();

        let first = shares.access_share_link_at(&link.token, now).unwrap().unwrap();
        assert!(first.accessed);
        assert_eq!(first.access_count, 1);

        let second = shares.access_share_link_at(&link.token, now).unwrap().unwrap();
        assert_eq!(second.access_count, 2);

        // Still valid at the exact expiry instant
        assert!(shares
            .access_share_link_at(&link.token, link.expires_at)
            .unwrap()
            .is_some());

        let after = link.expires_at + Duration::milliseconds(1);
        assert!(shares.access_share_link_at(&link.token, after).unwrap().is_none());
        assert_eq!(shares.share_link_info_at(&link.token, after).unwrap().access_count, 3);
    }

    #[test]
    fn test_unknown_token_is_not_found() {
        let mut store = store();
        let mut shares = ShareManager::new(&mut store);

        assert!(shares.access_share_link("nope").unwrap().is_none());
        assert!(shares.get_shared_report("nope").unwrap().is_none());
        assert!(matches!(
            shares.open_shared_report("nope").unwrap_err(),
            ShareError::ExpiredOrMissing
        ));
    }

    #[test]
    fn test_get_shared_report() {
        let mut store = store();
        let (inspection_id, report_id) = inspection_with_report(&mut store);
        let mut shares = ShareManager::new(&mut store);

        let link = shares
            .create_share_link_at(inspection_id, report_id, Utc::now())
            .unwrap();
        let report = shares.get_shared_report(&link.token).unwrap().unwrap();
        assert_eq!(report.id, report_id);
        assert_eq!(report.data, b"%PDF-1.5".to_vec());
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut store = store();
        let (inspection_id, report_id) = inspection_with_report(&mut store);

        let token = {
            let mut shares = ShareManager::new(&mut store);
            let link = shares
                .create_share_link_at(inspection_id, report_id, Utc::now())
                .unwrap();
            shares.revoke_share_link(&link.token).unwrap();
            shares.revoke_share_link(&link.token).unwrap();
            link.token
        };

        assert!(store.get_share_link(&token).unwrap().is_none());
        let report = store.require_report(report_id).unwrap();
        assert!(report.share_token.is_none());
        assert!(report.share_expires_at.is_none());
    }

    #[test]
    fn test_cleanup_removes_links_expiring_at_or_before_now() {
        let mut store = store();
        let (inspection_id, report_id) = inspection_with_report(&mut store);
        let mut shares = ShareManager::new(&mut store).with_expiry(Duration::hours(1));
        let t0 = now_ms();

        let early = shares
            .create_share_link_at(inspection_id, report_id, t0)
            .unwrap();
        let late = shares
            .create_share_link_at(inspection_id, report_id, t0 + Duration::hours(2))
            .unwrap();

        let deleted = shares.cleanup_expired_shares_at(early.expires_at).unwrap();
        assert_eq!(deleted, 1);
        assert!(!shares.share_link_info(&early.token).unwrap().exists);
        assert!(shares.share_link_info(&late.token).unwrap().exists);
    }

    #[test]
    fn test_huge_expiry_is_an_error() {
        let mut store = Store::open_in_memory(Config {
            share_expiry_days: 100_000_000,
            ..Config::default()
        })
        .unwrap();
        let (inspection_id, report_id) = inspection_with_report(&mut store);

        let err = ShareManager::new(&mut store)
            .create_share_link(inspection_id, report_id)
            .unwrap_err();
        assert!(matches!(
            err,
            ShareError::ExpiryOutOfRange { days: 100_000_000 }
        ));
        assert!(store.share_links_for_inspection(inspection_id).unwrap().is_empty());
        assert!(store.require_report(report_id).unwrap().share_token.is_none());
    }

    #[test]
    fn test_report_must_belong_to_inspection() {
        let mut store = store();
        let (_, report_id) = inspection_with_report(&mut store);
        let (other_inspection, _) = inspection_with_report(&mut store);

        let err = ShareManager::new(&mut store)
            .create_share_link(other_inspection, report_id)
            .unwrap_err();
        assert!(matches!(err, ShareError::ReportMismatch { .. }));

        let err = ShareManager::new(&mut store)
            .create_share_link(other_inspection, Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, ShareError::ReportNotFound(_)));
    }

    #[test]
    fn test_share_inspection_generates_report_when_missing() {
        let mut store = store();
        let inspection = store
            .create_inspection(NewInspection::new(
                "742 Evergreen Terrace",
                NaiveDate::from_ymd_opt(2024, 10, 2).unwrap(),
            ))
            .unwrap();
        store
            .add_room(NewRoom::new(inspection.id, RoomType::Basement))
            .unwrap();

        let url = ShareManager::new(&mut store)
            .share_inspection(inspection.id)
            .unwrap();
        assert!(url.starts_with("http://localhost:3000/share/"));

        let reports = store.reports_for_inspection(inspection.id).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].share_token.is_some());
        assert_eq!(
            store.require_inspection(inspection.id).unwrap().status,
            InspectionStatus::Shared
        );
    }

    #[test]
    fn test_share_inspection_reuses_latest_report() {
        let mut store = store();
        let (inspection_id, report_id) = inspection_with_report(&mut store);

        let link = ShareManager::new(&mut store)
            .share_inspection_at(inspection_id, Utc::now())
            .unwrap();

        assert_eq!(store.reports_for_inspection(inspection_id).unwrap().len(), 1);
        let found = store.report_for_share_token(&link.token).unwrap().unwrap();
        assert_eq!(found.id, report_id);
    }
}
