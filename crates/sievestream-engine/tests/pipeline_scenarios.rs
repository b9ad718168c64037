//! End-to-end pipeline scenarios

use futures::StreamExt;
use sievestream_engine::{
    actions, sanitize, sanitize_stream, KeywordRegistry, PipelineConfig, StreamProcessor,
};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

fn frags(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn redact_then_halt_scenario() {
    let mut registry = KeywordRegistry::new();
    registry.register("secret", actions::replace("[REDACTED]")).unwrap();
    registry.register("halt", actions::halt()).unwrap();

    let pulled = Rc::new(Cell::new(0usize));
    let counter = pulled.clone();
    let source = frags(&[
        "This is a secret message. ",
        "Now we will halt the stream here.",
        "You should not see this.",
    ])
    .into_iter()
    .map(move |f| {
        counter.set(counter.get() + 1);
        f
    });

    let mut pipeline = sanitize(Arc::new(registry), source, PipelineConfig::chunk()).unwrap();
    let output: String = pipeline.by_ref().map(|u| u.unwrap()).collect();

    assert_eq!(output, "This is a [REDACTED] message. Now we will ");
    assert!(pipeline.is_halted());
    // the fragment after the halting one is never pulled
    assert_eq!(pulled.get(), 2);
}

#[test]
fn cross_fragment_drop_scenario() {
    let mut registry = KeywordRegistry::new();
    registry.register("ab", actions::drop()).unwrap();

    let pipeline = sanitize(
        Arc::new(registry),
        frags(&["a", "b", "c"]),
        PipelineConfig::chunk(),
    )
    .unwrap();
    let output: String = pipeline.map(|u| u.unwrap()).collect();
    assert_eq!(output, "c");
}

#[test]
fn order_preserved_without_matches() {
    let mut registry = KeywordRegistry::new();
    registry.register("zzz", actions::drop()).unwrap();

    let input = ["The quick brown ", "fox jumps ", "over the lazy dog"];
    let pipeline = sanitize(Arc::new(registry), frags(&input), PipelineConfig::chunk()).unwrap();
    let output: String = pipeline.map(|u| u.unwrap()).collect();
    assert_eq!(output, input.concat());
}

#[test]
fn longest_keyword_wins_across_fragments() {
    let mut registry = KeywordRegistry::new();
    registry.register("sec", actions::replace("[SHORT]")).unwrap();
    registry.register("secret", actions::replace("[LONG]")).unwrap();

    let pipeline = sanitize(
        Arc::new(registry),
        frags(&["the se", "cr", "et plan"]),
        PipelineConfig::chunk(),
    )
    .unwrap();
    let output: String = pipeline.map(|u| u.unwrap()).collect();
    assert_eq!(output, "the [LONG] plan");
}

#[test]
fn keyword_prefix_never_leaks_early() {
    // Every split of the keyword into two non-empty fragments: feeding the
    // first half alone must produce nothing derived from it.
    let keyword = "secret";
    for cut in 1..keyword.len() {
        let mut registry = KeywordRegistry::new();
        registry.register(keyword, actions::drop()).unwrap();

        let mut sp = StreamProcessor::new(Arc::new(registry)).unwrap();
        sp.push(&keyword[..cut]).unwrap();
        assert!(
            sp.drain_output().is_empty(),
            "prefix {:?} leaked",
            &keyword[..cut]
        );

        sp.push(&keyword[cut..]).unwrap();
        sp.finish().unwrap();
        assert!(sp.drain_output().is_empty());
    }
}

#[test]
fn continuous_segment_suppressed_end_to_end() {
    let mut registry = KeywordRegistry::new();
    registry.register("<think>", actions::continuous_drop()).unwrap();
    registry.register("</think>", actions::continuous_pass()).unwrap();

    let pipeline = sanitize(
        Arc::new(registry),
        frags(&["answer: <thi", "nk>internal reasoning</thi", "nk> 42"]),
        PipelineConfig::chunk(),
    )
    .unwrap();
    let output: String = pipeline.map(|u| u.unwrap()).collect();
    assert_eq!(output, "answer: </think> 42");
}

#[test]
fn token_mode_respects_prefix_safety() {
    let mut registry = KeywordRegistry::new();
    registry.register("secret", actions::replace("[X]")).unwrap();

    let pipeline = sanitize(
        Arc::new(registry),
        frags(&["a sec", "ret b"]),
        PipelineConfig::token(),
    )
    .unwrap();
    let units: Vec<String> = pipeline.map(|u| u.unwrap()).collect();
    assert_eq!(units.concat(), "a [X] b");
    // no unit ever carried the withheld "sec" on its own
    assert!(units.iter().all(|u| !u.contains("sec")));
}

#[test]
fn history_informed_callback_halts_after_threshold() {
    let mut registry = KeywordRegistry::new();
    registry
        .register(
            "pw",
            Arc::new(|ctx: &sievestream_core::ActionContext<'_>| {
                // third occurrence terminates the stream
                if ctx.history.match_count(ctx.keyword) >= 2 {
                    Ok(sievestream_core::Decision::Halt)
                } else {
                    Ok(sievestream_core::Decision::replace("*"))
                }
            }),
        )
        .unwrap();

    let mut pipeline = sanitize(
        Arc::new(registry),
        frags(&["pw 1 pw 2 pw 3 tail"]),
        PipelineConfig::chunk(),
    )
    .unwrap();
    let output: String = pipeline.by_ref().map(|u| u.unwrap()).collect();
    assert_eq!(output, "* 1 * 2 ");
    assert!(pipeline.is_halted());
}

#[tokio::test]
async fn async_pipeline_matches_sync_behavior() {
    let mut registry = KeywordRegistry::new();
    registry.register("secret", actions::replace("[REDACTED]")).unwrap();

    let source = futures::stream::iter(frags(&["a sec", "ret message"]));
    let pipeline = sanitize_stream(Arc::new(registry), source, PipelineConfig::chunk()).unwrap();
    let output: String = pipeline.map(|u| u.unwrap()).collect().await;
    assert_eq!(output, "a [REDACTED] message");
}

#[tokio::test]
async fn async_halt_stops_polling_source() {
    let mut registry = KeywordRegistry::new();
    registry.register("halt", actions::halt()).unwrap();

    let source = futures::stream::unfold(0u32, |n| async move {
        match n {
            0 => Some(("before halt after".to_string(), 1)),
            _ => panic!("source polled past halt"),
        }
    });

    let mut pipeline =
        Box::pin(sanitize_stream(Arc::new(registry), source, PipelineConfig::chunk()).unwrap());
    let mut output = String::new();
    while let Some(unit) = pipeline.next().await {
        output.push_str(&unit.unwrap());
    }
    assert_eq!(output, "before ");
    assert!(pipeline.is_halted());
}

#[tokio::test]
async fn async_callback_error_surfaces_once() {
    let mut registry = KeywordRegistry::new();
    registry
        .register(
            "bad",
            Arc::new(|_: &sievestream_core::ActionContext<'_>| {
                Err(sievestream_core::Error::callback("boom"))
            }),
        )
        .unwrap();

    let source = futures::stream::iter(frags(&["ok bad rest"]));
    let mut pipeline =
        sanitize_stream(Arc::new(registry), source, PipelineConfig::chunk()).unwrap();

    assert_eq!(pipeline.next().await.unwrap().unwrap(), "ok ");
    assert!(matches!(
        pipeline.next().await,
        Some(Err(sievestream_core::Error::Callback(_)))
    ));
    assert!(pipeline.next().await.is_none());
}
