//! Unit tests for variable_helpers module

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_project_variable;
    use crate::variable_helpers::*;
    use crds::{Reference, SecretKeySelector, Selector, VariableParameters, VariableType};
    use gitlab_client::{GitLabError, ProjectVariable, VariableTypeValue};

    /// Inverse of `variable_to_parameters`: what GitLab would hold for `p`
    fn to_remote(p: &VariableParameters) -> ProjectVariable {
        ProjectVariable {
            key: p.key.clone(),
            value: p.value.clone().unwrap_or_default(),
            variable_type: p.variable_type.map(to_variable_type_value).unwrap_or_default(),
            protected: p.protected.unwrap_or_default(),
            masked: p.masked.unwrap_or_default(),
            raw: p.raw.unwrap_or_default(),
            environment_scope: p.environment_scope.clone().unwrap_or_default(),
            description: None,
        }
    }

    fn full_parameters() -> VariableParameters {
        VariableParameters {
            project_id: Some("42".to_string()),
            key: "DEPLOY_KEY".to_string(),
            value: Some("ssh-ed25519 AAAA".to_string()),
            variable_type: Some(VariableType::File),
            protected: Some(true),
            masked: Some(false),
            environment_scope: Some("production".to_string()),
            raw: Some(true),
            ..Default::default()
        }
    }

    fn observed_file_variable() -> ProjectVariable {
        ProjectVariable {
            variable_type: VariableTypeValue::File,
            protected: true,
            masked: true,
            raw: true,
            ..create_test_project_variable("FOO", "bar", "review/*")
        }
    }

    fn response_error(status: u16, message: &str) -> GitLabError {
        GitLabError::Response {
            method: "GET".to_string(),
            url: "https://gitlab.example.com/api/v4/projects/42/variables/FOO".to_string(),
            status,
            message: message.to_string(),
        }
    }

    // Error classification

    #[test]
    fn test_not_found_none_is_false() {
        assert!(!is_error_variable_not_found::<GitLabError>(None));
    }

    #[test]
    fn test_not_found_matches_gitlab_text() {
        assert!(is_error_variable_not_found(Some("404 Variable Not Found")));
        assert!(is_error_variable_not_found(Some(&response_error(404, "404 Variable Not Found"))));
    }

    #[test]
    fn test_not_found_rejects_other_errors() {
        assert!(!is_error_variable_not_found(Some("500 Internal Server Error")));
        assert!(!is_error_variable_not_found(Some(&response_error(404, "404 Project Not Found"))));
        assert!(!is_error_variable_not_found(Some(&GitLabError::Authentication(
            "401 Unauthorized".to_string()
        ))));
    }

    // Late initialization

    #[test]
    fn test_late_initialize_empty_desired_copies_observed() {
        let observed = observed_file_variable();
        let mut desired = VariableParameters {
            key: "FOO".to_string(),
            ..Default::default()
        };

        late_initialize_variable(&mut desired, Some(&observed));

        assert_eq!(desired.variable_type, Some(VariableType::File));
        assert_eq!(desired.protected, Some(true));
        assert_eq!(desired.masked, Some(true));
        assert_eq!(desired.environment_scope.as_deref(), Some("review/*"));
        assert_eq!(desired.raw, Some(true));
        assert_eq!(desired.value, None);
    }

    #[test]
    fn test_late_initialize_keeps_user_values() {
        let observed = observed_file_variable();
        let mut desired = VariableParameters {
            key: "FOO".to_string(),
            variable_type: Some(VariableType::EnvVar),
            protected: Some(false),
            environment_scope: Some("production".to_string()),
            ..Default::default()
        };

        late_initialize_variable(&mut desired, Some(&observed));

        assert_eq!(desired.variable_type, Some(VariableType::EnvVar));
        assert_eq!(desired.protected, Some(false));
        assert_eq!(desired.environment_scope.as_deref(), Some("production"));
        assert_eq!(desired.masked, Some(true));
    }

    #[test]
    fn test_late_initialize_is_idempotent() {
        let observed = observed_file_variable();
        let mut desired = VariableParameters {
            key: "FOO".to_string(),
            ..Default::default()
        };

        late_initialize_variable(&mut desired, Some(&observed));
        let snapshot = desired.clone();
        late_initialize_variable(&mut desired, Some(&observed));

        assert_eq!(desired, snapshot);
    }

    #[test]
    fn test_late_initialize_without_observation_is_noop() {
        let mut desired = full_parameters();
        desired.protected = None;
        let snapshot = desired.clone();

        late_initialize_variable(&mut desired, None);

        assert_eq!(desired, snapshot);
    }

    #[test]
    fn test_late_initialize_copies_instead_of_aliasing() {
        let mut observed = observed_file_variable();
        let mut desired = VariableParameters::default();

        late_initialize_variable(&mut desired, Some(&observed));
        observed.environment_scope = "changed".to_string();

        assert_eq!(desired.environment_scope.as_deref(), Some("review/*"));
    }

    // Request builders

    #[test]
    fn test_create_options_copy_every_field() {
        let options = generate_create_variable_options(&full_parameters());

        assert_eq!(options.key, "DEPLOY_KEY");
        assert_eq!(options.value.as_deref(), Some("ssh-ed25519 AAAA"));
        assert_eq!(options.variable_type, Some(VariableTypeValue::File));
        assert_eq!(options.protected, Some(true));
        assert_eq!(options.masked, Some(false));
        assert_eq!(options.environment_scope.as_deref(), Some("production"));
        assert_eq!(options.raw, Some(true));
    }

    #[test]
    fn test_create_options_keep_unset_fields_absent() {
        let params = VariableParameters {
            key: "FOO".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(generate_create_variable_options(&params)).unwrap();
        assert_eq!(body, serde_json::json!({ "key": "FOO" }));
    }

    #[test]
    fn test_update_options_carry_scope_filter() {
        let options = generate_update_variable_options(&full_parameters());

        assert_eq!(options.value.as_deref(), Some("ssh-ed25519 AAAA"));
        assert_eq!(options.variable_type, Some(VariableTypeValue::File));
        assert_eq!(options.environment_scope.as_deref(), Some("production"));
        assert_eq!(
            options.filter.map(|f| f.environment_scope).as_deref(),
            Some("production")
        );
    }

    #[test]
    fn test_update_options_without_scope_have_no_filter() {
        let mut params = full_parameters();
        params.environment_scope = None;
        assert!(generate_update_variable_options(&params).filter.is_none());
    }

    #[test]
    fn test_get_and_remove_options_follow_scope() {
        let mut params = full_parameters();

        let get = generate_get_variable_options(&params).expect("scope set");
        let remove = generate_remove_variable_options(&params).expect("scope set");
        assert_eq!(get.filter.unwrap().environment_scope, "production");
        assert_eq!(remove.filter.unwrap().environment_scope, "production");

        params.environment_scope = None;
        assert!(generate_get_variable_options(&params).is_none());
        assert!(generate_remove_variable_options(&params).is_none());
        assert!(generate_variable_filter(&params).is_none());
    }

    // Equivalence

    #[test]
    fn test_up_to_date_without_desired() {
        assert!(is_variable_up_to_date(None, &observed_file_variable()));
    }

    #[test]
    fn test_up_to_date_round_trip() {
        let params = full_parameters();
        assert!(is_variable_up_to_date(Some(&params), &to_remote(&params)));

        let bare = VariableParameters {
            key: "FOO".to_string(),
            ..Default::default()
        };
        assert!(is_variable_up_to_date(Some(&bare), &to_remote(&bare)));
    }

    #[test]
    fn test_up_to_date_ignores_project_and_references() {
        let params = full_parameters();
        let remote = to_remote(&params);

        let mut moved = params.clone();
        moved.project_id = Some("group/other".to_string());
        assert!(is_variable_up_to_date(Some(&moved), &remote));

        moved.project_id_ref = Some(Reference::new("other-project"));
        moved.project_id_selector = Some(Selector::default());
        moved.value_secret_ref = Some(SecretKeySelector::new("ci-secrets", "deploy-key"));
        assert!(is_variable_up_to_date(Some(&moved), &remote));

        let mut drifted = params.clone();
        drifted.masked = Some(true);
        let mut drifted_moved = drifted.clone();
        drifted_moved.project_id = None;
        assert_eq!(
            is_variable_up_to_date(Some(&drifted), &remote),
            is_variable_up_to_date(Some(&drifted_moved), &remote)
        );
    }

    #[test]
    fn test_up_to_date_detects_drift() {
        let params = full_parameters();
        let remote = to_remote(&params);

        let mut changed = params.clone();
        changed.value = Some("rotated".to_string());
        assert!(!is_variable_up_to_date(Some(&changed), &remote));

        let mut changed = params.clone();
        changed.variable_type = Some(VariableType::EnvVar);
        assert!(!is_variable_up_to_date(Some(&changed), &remote));

        let mut changed = params.clone();
        changed.environment_scope = Some("staging".to_string());
        assert!(!is_variable_up_to_date(Some(&changed), &remote));

        let mut changed = params;
        changed.key = "OTHER".to_string();
        assert!(!is_variable_up_to_date(Some(&changed), &remote));
    }

    #[test]
    fn test_up_to_date_treats_empty_as_absent() {
        let remote = create_test_project_variable("FOO", "", "");
        let params = VariableParameters {
            key: "FOO".to_string(),
            value: Some(String::new()),
            protected: Some(false),
            masked: Some(false),
            ..Default::default()
        };
        assert!(is_variable_up_to_date(Some(&params), &remote));
    }

    #[test]
    fn test_unset_fields_only_match_zero_values() {
        let bare = VariableParameters {
            key: "FOO".to_string(),
            ..Default::default()
        };
        let observed = ProjectVariable {
            protected: true,
            masked: true,
            ..create_test_project_variable("FOO", "bar", "production")
        };
        assert!(!is_variable_up_to_date(Some(&bare), &observed));

        let zero = create_test_project_variable("FOO", "bar", "");
        assert!(is_variable_up_to_date(Some(&bare), &zero));
    }

    #[test]
    fn test_unset_value_matches_any_observed_value() {
        let mut desired = full_parameters();
        let remote = to_remote(&desired);
        desired.value = None;
        assert!(is_variable_up_to_date(Some(&desired), &remote));
    }

    #[test]
    fn test_variable_to_parameters_projection() {
        let params = variable_to_parameters(&observed_file_variable());

        assert_eq!(params.key, "FOO");
        assert_eq!(params.value.as_deref(), Some("bar"));
        assert_eq!(params.variable_type, Some(VariableType::File));
        assert_eq!(params.environment_scope.as_deref(), Some("review/*"));
        assert!(params.project_id.is_none());
        assert!(params.value_secret_ref.is_none());
    }

    #[test]
    fn test_foo_bar_scenario() {
        let observed = create_test_project_variable("FOO", "bar", "*");
        let mut desired = VariableParameters {
            key: "FOO".to_string(),
            ..Default::default()
        };

        late_initialize_variable(&mut desired, Some(&observed));

        assert_eq!(desired.environment_scope.as_deref(), Some("*"));
        assert_eq!(desired.variable_type, Some(VariableType::EnvVar));
        assert!(is_variable_up_to_date(Some(&desired), &observed));
    }

    #[test]
    fn test_variable_type_conversion() {
        for variable_type in [VariableType::EnvVar, VariableType::File] {
            assert_eq!(from_variable_type_value(to_variable_type_value(variable_type)), variable_type);
        }
    }
}
