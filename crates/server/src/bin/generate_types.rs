use db::models::{activity::ActivityKind, user_subscription::UserSubscription};
use server::routes::{
    activity::RecordActivityRequest,
    auth::LoginCallbackResponse,
    health::HealthReport,
    onboarding::{CompleteOnboardingRequest, OnboardingStatus},
    trial::InitTrialResponse,
};
use services::services::{
    access::AccessDecision,
    database_validator::ValidationResult,
    login::RedirectTarget,
    streak::{DayActivity, StreakSummary},
};
use ts_rs::TS;
use utils::correlation::CorrelationId;

fn main() {
    let decls = [
        CorrelationId::decl(),
        AccessDecision::decl(),
        UserSubscription::decl(),
        InitTrialResponse::decl(),
        RedirectTarget::decl(),
        LoginCallbackResponse::decl(),
        CompleteOnboardingRequest::decl(),
        OnboardingStatus::decl(),
        ActivityKind::decl(),
        RecordActivityRequest::decl(),
        DayActivity::decl(),
        StreakSummary::decl(),
        ValidationResult::decl(),
        HealthReport::decl(),
    ];

    println!("// This file was generated by `cargo run --bin generate-types`. Do not edit.\n");
    for decl in decls {
        println!("export {decl}\n");
    }
}
