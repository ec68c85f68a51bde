// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{fast_options, panel, single_page, Fault, Page, ScriptedEngine};
use cep_crawler::domain::models::region::RegionCode;
use cep_crawler::domain::services::locality_extractor::NEXT_PAGE_FORM;
use cep_crawler::utils::errors::CrawlError;
use cep_crawler::workers::orchestrator::CrawlOptions;
use cep_crawler::workers::region_session::{region_option, RegionSession, REGION_SELECT};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

async fn run_session(
    engine: &ScriptedEngine,
    region: RegionCode,
    options: &CrawlOptions,
) -> cep_crawler::workers::region_session::SessionOutcome {
    let pool = Semaphore::new(1);
    let cancel = CancellationToken::new();
    RegionSession::new(region, options)
        .run(engine, &pool, &cancel)
        .await
}

#[tokio::test]
async fn test_session_walks_every_page() {
    let engine = ScriptedEngine::builder()
        .pages(
            RegionCode::MG,
            vec![
                panel(Page::First, &[("Abadia dos Dourados", "38540-000 a 38549-999")], true),
                panel(
                    Page::Next,
                    &[
                        ("Abaeté", "35620-000 a 35629-999"),
                        ("Abre Campo", "35365-000 a 35369-999"),
                    ],
                    true,
                ),
                panel(Page::Next, &[("Acaiaca", "35438-000 a 35439-999")], false),
            ],
        )
        .build();
    let stats = engine.stats();

    let outcome = run_session(&engine, RegionCode::MG, &fast_options()).await;

    assert!(outcome.is_success(), "error: {:?}", outcome.error);
    assert_eq!(outcome.pages, 3);
    assert_eq!(stats.next_clicks(), 2);
    let names: Vec<&str> = outcome
        .result
        .localities
        .iter()
        .map(|l| l.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Abadia dos Dourados", "Abaeté", "Abre Campo", "Acaiaca"]
    );
    assert_eq!(stats.opened(), 1);
    assert_eq!(stats.closed(), 1);
}

#[tokio::test]
async fn test_single_page_never_paginates() {
    let engine = ScriptedEngine::builder()
        .pages(RegionCode::RR, single_page(&[("Boa Vista", "69300-001 a 69339-999")]))
        .build();
    let stats = engine.stats();

    let outcome = run_session(&engine, RegionCode::RR, &fast_options()).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.pages, 1);
    assert_eq!(stats.next_clicks(), 0);
}

#[tokio::test]
async fn test_page_limit_keeps_partial_results() {
    let engine = ScriptedEngine::builder()
        .fault(RegionCode::SP, Fault::EndlessPagination)
        .build();
    let stats = engine.stats();
    let options = CrawlOptions {
        max_pages: 3,
        ..fast_options()
    };

    let outcome = run_session(&engine, RegionCode::SP, &options).await;

    assert_eq!(
        outcome.error,
        Some(CrawlError::PaginationLimitExceeded {
            region: RegionCode::SP,
            limit: 3
        })
    );
    assert_eq!(outcome.pages, 3);
    assert_eq!(outcome.result.localities.len(), 3);
    assert_eq!(stats.next_clicks(), 2);
    assert_eq!(stats.closed(), 1);
}

#[tokio::test]
async fn test_missing_region_option_times_out() {
    let engine = ScriptedEngine::builder()
        .fault(RegionCode::TO, Fault::MissingOption)
        .build();

    let outcome = run_session(&engine, RegionCode::TO, &fast_options()).await;

    assert_eq!(
        outcome.error,
        Some(CrawlError::SelectorTimeout {
            region: RegionCode::TO,
            selector: region_option(RegionCode::TO),
        })
    );
}

#[tokio::test]
async fn test_stuck_pagination_times_out() {
    let engine = ScriptedEngine::builder()
        .pages(
            RegionCode::GO,
            vec![
                panel(Page::First, &[("Abadia de Goiás", "75345-000 a 75349-999")], true),
                panel(Page::Next, &[("Abadiânia", "72940-000 a 72949-999")], true),
            ],
        )
        .fault(RegionCode::GO, Fault::StuckPagination)
        .build();
    let stats = engine.stats();

    let outcome = run_session(&engine, RegionCode::GO, &fast_options()).await;

    assert_eq!(
        outcome.error,
        Some(CrawlError::SelectorTimeout {
            region: RegionCode::GO,
            selector: NEXT_PAGE_FORM.to_string(),
        })
    );
    assert_eq!(outcome.pages, 2);
    assert_eq!(stats.closed(), 1);
}

#[tokio::test]
async fn test_navigation_error_maps_to_navigation_failure() {
    let engine = ScriptedEngine::builder()
        .navigation_error("net::ERR_NAME_NOT_RESOLVED")
        .build();

    let outcome = run_session(&engine, RegionCode::PI, &fast_options()).await;

    match outcome.error {
        Some(CrawlError::NavigationFailure { region, reason }) => {
            assert_eq!(region, RegionCode::PI);
            assert!(reason.contains("ERR_NAME_NOT_RESOLVED"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(outcome.result.is_empty());
}

#[tokio::test]
async fn test_empty_panel_is_extraction_failure() {
    let engine = ScriptedEngine::builder()
        .fault(RegionCode::AP, Fault::EmptyPanel)
        .build();

    let outcome = run_session(&engine, RegionCode::AP, &fast_options()).await;

    assert!(matches!(
        outcome.error,
        Some(CrawlError::ExtractionFailure {
            region: RegionCode::AP,
            ..
        })
    ));
}

#[tokio::test]
async fn test_cancelled_before_start_opens_nothing() {
    let engine = ScriptedEngine::builder().build();
    let stats = engine.stats();
    let pool = Semaphore::new(1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = RegionSession::new(RegionCode::MA, &fast_options())
        .run(&engine, &pool, &cancel)
        .await;

    assert_eq!(outcome.error, Some(CrawlError::Cancelled));
    assert_eq!(stats.opened(), 0);
}

#[tokio::test]
async fn test_form_must_render_before_selection() {
    // The form wait uses the region select as its readiness probe.
    let engine = ScriptedEngine::builder().build();
    let mut ctx = cep_crawler::engines::traits::BrowserEngine::open_context(&engine)
        .await
        .expect("context");

    assert!(!ctx.is_visible(REGION_SELECT).await.expect("probe"));
    ctx.navigate("https://cep.example.test").await.expect("navigate");
    assert!(ctx.is_visible(REGION_SELECT).await.expect("probe"));
    ctx.close().await.expect("close");
}
