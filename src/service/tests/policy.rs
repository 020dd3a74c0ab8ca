use super::*;

#[parameterized(
    anonymous = { None, Outcome::Unauthenticated },
    viewer = { Some(&["role=Viewer"][..]), Outcome::Forbidden },
    no_roles = { Some(&["sub=u1"][..]), Outcome::Forbidden },
    customer = { Some(&["role=Customer"][..]), Outcome::Succeeded },
    admin = { Some(&["role=Admin"][..]), Outcome::Succeeded },
    viewer_and_customer = { Some(&["role=Viewer", "role=Customer"][..]), Outcome::Succeeded },
)]
fn test_search_policy(claims: Option<&[&str]>, expected: Outcome) {
    let service = movie_service(&[]);
    let user = claims.map(principal).unwrap_or_else(Principal::anonymous);
    let result = service.authorize_policy(&user, Policy::SEARCH).unwrap();
    assert_eq!(result.outcome(), expected);
}

#[test]
fn test_anonymous_with_roles_still_needs_identity() {
    let service = movie_service(&[]);
    let anonymous_admin = Principal::anonymous().with_claim(Claim::role("Admin"));
    let result = service
        .authorize_policy(&anonymous_admin, Policy::SEARCH)
        .unwrap();
    assert_eq!(result.outcome(), Outcome::Unauthenticated);
    assert_eq!(
        result.failure_reasons(),
        ["SearchPolicy requires an authenticated user"]
    );
}

#[test]
fn test_default_policy() {
    let service = movie_service(&[]);
    assert!(
        service
            .authorize_policy(&principal(&[]), Policy::DEFAULT)
            .unwrap()
            .succeeded()
    );
    assert_eq!(
        service
            .authorize_policy(&Principal::anonymous(), Policy::DEFAULT)
            .unwrap()
            .outcome(),
        Outcome::Unauthenticated
    );
}

#[test]
fn test_policy_requirements_are_anded() {
    let service = movie_service(&[]);
    let policy = Policy::builder("StaffWithSubject")
        .require_role(["Admin", "Customer"])
        .require_claim("sub", Vec::<String>::new())
        .build();

    assert!(
        service
            .authorize_with(&principal(&["role=Customer", "sub=u1"]), &policy)
            .succeeded()
    );

    let result = service.authorize_with(&principal(&["role=Viewer"]), &policy);
    assert_eq!(
        result.failure_reasons(),
        [
            "claim 'role' in [Admin, Customer] not satisfied",
            "claim 'sub' not satisfied"
        ]
    );
}

#[test]
fn test_policy_without_authentication_flag_reports_unauthenticated_on_failure() {
    let service = movie_service(&[]);
    let policy = Policy::builder("Customers").require_role(["Customer"]).build();
    let result = service.authorize_with(&Principal::anonymous(), &policy);
    assert_eq!(result.outcome(), Outcome::Unauthenticated);
}

#[test]
fn test_operation_inside_policy_fails_without_resource() {
    let service = movie_service(&["France"]);
    let policy = Policy::builder("Reviewing")
        .require(Operation::review())
        .build();
    let result = service.authorize_with(&principal(&["role=Reviewer"]), &policy);
    assert_eq!(result.failure_reasons(), ["Review requires a resource"]);
}
