// Unit tests for user-admin
// These tests work with the public API without modifying the main codebase

#[cfg(test)]
mod repo_tests {
    use chrono::NaiveDate;
    use user_admin::error::AdminError;
    use user_admin::model::{Status, UserFields};
    use user_admin::repo::{Repository, page_count, paginate};
    use user_admin::search::ListFilter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, 31).unwrap()
    }

    #[test]
    fn test_demo_repository_contents() {
        let repo = Repository::with_demo_data();
        assert_eq!(repo.len(), 7);
        assert_eq!(repo.get(2).unwrap().name, "Jane Smith");
        assert!(matches!(repo.get(42), Err(AdminError::NotFound { id: 42 })));
    }

    #[test]
    fn test_create_update_delete_cycle() {
        let mut repo = Repository::with_demo_data();
        let created = repo
            .create(
                UserFields {
                    name: "Nina Park".into(),
                    email: "nina@example.com".into(),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();
        assert_eq!(created.id, 8);
        assert_eq!(created.status, Status::Active);
        assert_eq!(created.created_date(), "2023-07-31");

        let updated = repo
            .update(
                8,
                UserFields {
                    name: "Nina Park".into(),
                    email: "nina.park@example.com".into(),
                    status: Some(Status::Inactive),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.email, "nina.park@example.com");
        assert_eq!(updated.created_at, created.created_at);

        repo.delete(8).unwrap();
        assert!(repo.delete(8).is_err());
        assert_eq!(repo.len(), 7);
    }

    #[test]
    fn test_create_rejects_invalid_fields() {
        let mut repo = Repository::new();
        let err = repo
            .create(
                UserFields {
                    name: "No Mail".into(),
                    email: "not-an-address".into(),
                    ..Default::default()
                },
                today(),
            )
            .unwrap_err();
        assert!(matches!(err, AdminError::Validation { ref field, .. } if field == "email"));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_list_with_filter() {
        let repo = Repository::with_demo_data();
        let inactive = repo.list(&ListFilter::new("", Some(Status::Inactive)));
        let names: Vec<_> = inactive.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Robert Johnson", "Sarah Wilson"]);
        assert_eq!(repo.list(&ListFilter::new("EXAMPLE.COM", None)).len(), 7);
    }

    #[test]
    fn test_pagination_helpers() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(&items, 5, 1), &[1, 2, 3, 4, 5]);
        assert_eq!(paginate(&items, 5, 2), &[6, 7]);
        assert!(paginate(&items, 5, 3).is_empty());
        assert_eq!(page_count(7, 5), 2);
        assert_eq!(page_count(0, 5), 1);
    }
}

#[cfg(test)]
mod stats_tests {
    use chrono::NaiveDate;
    use user_admin::repo::demo_records;
    use user_admin::stats::{AggregateStats, MONTHS};

    #[test]
    fn test_stats_over_demo_data() {
        let today = NaiveDate::from_ymd_opt(2023, 7, 31).unwrap();
        let stats = AggregateStats::compute(&demo_records(), today);
        assert_eq!(stats.total_users, 7);
        assert_eq!(stats.active_users, 5);
        assert_eq!(stats.inactive_users, 2);
        assert_eq!(stats.new_users_this_month, 1);
        assert_eq!(stats.users_by_month.len(), 12);
        assert_eq!(stats.users_by_month[0].month, MONTHS[0]);
        let total: u32 = stats.users_by_month.iter().map(|m| m.count).sum();
        assert_eq!(total as usize, stats.total_users);
        assert_eq!(stats.active_percent(), 71);
    }
}

#[cfg(test)]
mod report_tests {
    use chrono::NaiveDate;
    use user_admin::report::{self, DateRange, ExportFormat, ExportRequest, ReportKind};
    use user_admin::repo::demo_records;
    use user_admin::stats::AggregateStats;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, 31).unwrap()
    }

    #[test]
    fn test_users_csv_export() {
        let req = ExportRequest::new(ReportKind::Users, ExportFormat::Csv, DateRange::All);
        let export = report::generate(&demo_records(), None, &req, today()).unwrap();
        assert_eq!(export.file_name, "users_export_all_2023-07-31.csv");
        assert_eq!(export.content_type, "text/csv;charset=utf-8");
        let text = String::from_utf8(export.bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ID,Name,Email,Status,Created Date"));
        assert_eq!(lines.next(), Some("1,John Doe,john@example.com,active,2023-01-15"));
        assert_eq!(text.lines().count(), 8);
    }

    #[test]
    fn test_date_range_limits_users_export() {
        let req = ExportRequest::new(ReportKind::Users, ExportFormat::Csv, DateRange::ThisMonth);
        let export = report::generate(&demo_records(), None, &req, today()).unwrap();
        let text = String::from_utf8(export.bytes).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("David Taylor"));
    }

    #[test]
    fn test_statistics_pdf_export() {
        let stats = AggregateStats::compute(&demo_records(), today());
        let req = ExportRequest::new(ReportKind::Statistics, ExportFormat::Pdf, DateRange::All);
        let export = report::generate(&[], Some(&stats), &req, today()).unwrap();
        assert_eq!(export.file_name, "statistics_export_2023-07-31.pdf");
        assert_eq!(export.content_type, "application/pdf");
        assert!(export.bytes.starts_with(b"%PDF-1.4"));
        assert!(export.bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_request_parsing() {
        assert_eq!("statistics".parse::<ReportKind>().unwrap(), ReportKind::Statistics);
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("this-month".parse::<DateRange>().unwrap(), DateRange::ThisMonth);
        assert!("weekly".parse::<DateRange>().is_err());
    }
}

#[cfg(test)]
mod search_tests {
    use user_admin::model::Status;
    use user_admin::repo::demo_records;
    use user_admin::search::ListFilter;

    #[test]
    fn test_search_and_status_combine() {
        let users = demo_records();
        let any = ListFilter::new("son", None);
        let names: Vec<_> = any.apply(&users).into_iter().map(|u| u.name).collect();
        assert_eq!(names, ["Robert Johnson", "Sarah Wilson"]);
        assert!(ListFilter::new("son", Some(Status::Active)).apply(&users).is_empty());
    }
}
