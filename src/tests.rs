#[cfg(test)]
mod tests {

    mod slug_tests {
        use crate::services::slug::{generate_slug, validate_slug, MAX_SLUG_LENGTH};

        #[test]
        fn test_generate_slug_basic() {
            assert_eq!(generate_slug("Hello World"), "hello-world");
        }

        #[test]
        fn test_generate_slug_special_characters() {
            assert_eq!(generate_slug("Hello, World!"), "hello-world");
        }

        #[test]
        fn test_generate_slug_unicode() {
            assert_eq!(generate_slug("Café au lait"), "cafe-au-lait");
        }

        #[test]
        fn test_generate_slug_truncates_long_titles() {
            let slug = generate_slug(&"a".repeat(250));
            assert_eq!(slug.len(), MAX_SLUG_LENGTH);
            assert!(validate_slug(&slug));
        }

        #[test]
        fn test_validate_slug_valid() {
            assert!(validate_slug("hello-world"));
            assert!(validate_slug("my_blog_post_2024"));
            assert!(validate_slug("Mixed-Case"));
            assert!(validate_slug("123"));
        }

        #[test]
        fn test_validate_slug_invalid() {
            assert!(!validate_slug(""));
            assert!(!validate_slug("hello world"));
            assert!(!validate_slug("hello!world"));
            assert!(!validate_slug("привет"));
        }

        #[test]
        fn test_validate_slug_length_bound() {
            assert!(validate_slug(&"a".repeat(200)));
            assert!(!validate_slug(&"a".repeat(201)));
        }
    }

    mod tag_title_tests {
        use crate::services::tags::clean_tag_title;
        use crate::ModelError;

        #[test]
        fn test_clean_lowercases() {
            assert_eq!(clean_tag_title("Django").unwrap(), "django");
            assert_eq!(clean_tag_title("RUST").unwrap(), "rust");
        }

        #[test]
        fn test_clean_trims_whitespace() {
            assert_eq!(clean_tag_title("  Web Dev ").unwrap(), "web dev");
        }

        #[test]
        fn test_clean_lowercases_non_ascii() {
            assert_eq!(clean_tag_title("ПИТОН").unwrap(), "питон");
        }

        #[test]
        fn test_clean_rejects_empty() {
            let err = clean_tag_title("   ").unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ModelError>(),
                Some(ModelError::Validation(_))
            ));
        }

        #[test]
        fn test_clean_length_counts_chars() {
            assert!(clean_tag_title(&"ж".repeat(20)).is_ok());
            assert!(clean_tag_title(&"a".repeat(21)).is_err());
        }
    }

    mod limit_tests {
        use crate::services::tags::sql_limit;

        #[test]
        fn test_sql_limit_none_means_unbounded() {
            assert_eq!(sql_limit(None), -1);
        }

        #[test]
        fn test_sql_limit_passes_small_values() {
            assert_eq!(sql_limit(Some(0)), 0);
            assert_eq!(sql_limit(Some(5)), 5);
        }

        #[test]
        fn test_sql_limit_saturates_instead_of_wrapping() {
            assert_eq!(sql_limit(Some(usize::MAX)), i64::MAX);
        }
    }

    mod model_tests {
        use crate::models::{format_timestamp, CommentLabel, Tag};
        use chrono::TimeZone;

        #[test]
        fn test_tag_display_and_url() {
            let tag = Tag {
                id: 1,
                title: "django".to_string(),
            };
            assert_eq!(tag.to_string(), "django");
            assert_eq!(tag.absolute_url(), "/tag/django");
        }

        #[test]
        fn test_comment_label_display() {
            let label = CommentLabel {
                author_username: "alice".to_string(),
                post_title: "First post".to_string(),
            };
            assert_eq!(label.to_string(), "alice under First post");
        }

        #[test]
        fn test_format_timestamp_sorts_as_text() {
            let earlier = chrono::Utc.with_ymd_and_hms(2024, 1, 9, 23, 0, 0).unwrap();
            let later = chrono::Utc.with_ymd_and_hms(2024, 1, 10, 1, 0, 0).unwrap();
            assert_eq!(format_timestamp(earlier), "2024-01-09 23:00:00");
            assert!(format_timestamp(earlier) < format_timestamp(later));
        }
    }

    mod password_tests {
        use crate::services::users::{hash_password, validate_password, verify_password};

        #[test]
        fn test_hash_and_verify() {
            let hash = hash_password("Password123").unwrap();
            assert!(hash.starts_with("$argon2"));
            assert!(verify_password("Password123", &hash));
            assert!(!verify_password("Password124", &hash));
        }

        #[test]
        fn test_verify_invalid_hash() {
            assert!(!verify_password("Password123", "not-a-hash"));
        }

        #[test]
        fn test_validate_password_rules() {
            assert!(validate_password("short").is_err());
            assert!(validate_password("12345678").is_err());
            assert!(validate_password("longenough").is_ok());
        }
    }

    mod config_tests {
        use crate::Config;
        use std::path::Path;

        #[test]
        fn test_config_load_missing_file() {
            let result = Config::load(Path::new("/nonexistent/path.toml"));
            assert!(result.is_err());
        }

        #[test]
        fn test_config_defaults() {
            let config = Config::parse(
                r#"
[database]
path = "data/blog.db"
"#,
            )
            .unwrap();
            assert_eq!(config.database.pool_size, 10);
            assert_eq!(config.listing.popular_limit, 5);
            assert_eq!(config.listing.posts_per_page, 10);
        }

        #[test]
        fn test_config_load_valid_toml() {
            use std::io::Write;
            let config_path = std::env::temp_dir().join("test_blogdata_config.toml");

            let config_content = r#"
[database]
path = "data/blog.db"
pool_size = 4

[listing]
popular_limit = 3
posts_per_page = 20
"#;

            let mut file = std::fs::File::create(&config_path).unwrap();
            file.write_all(config_content.as_bytes()).unwrap();

            let config = Config::load(&config_path).unwrap();
            assert_eq!(config.database.path, "data/blog.db");
            assert_eq!(config.database.pool_size, 4);
            assert_eq!(config.listing.popular_limit, 3);

            std::fs::remove_file(&config_path).ok();
        }

        #[test]
        fn test_config_rejects_bad_values() {
            assert!(Config::parse("[database]\npath = \"x.db\"\npool_size = 0\n").is_err());
            assert!(Config::parse(
                "[database]\npath = \"x.db\"\n[listing]\nposts_per_page = 101\n"
            )
            .is_err());
        }
    }
}
