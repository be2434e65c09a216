//! Registers both default engines and exercises registry dispatch end to
//! end: extension normalization routes a script to the right engine, that
//! engine compiles it, and the validator's six-layer report agrees the
//! script is acceptable.

use pipeline_domain::repositories::DslCompilationResult;
use pipeline_domain::value_objects::{DslCompilationContext, DslExecutionContext};
use pipeline_engine::infrastructure::dsl::{validate_and_log, DslEngineRegistry, JsonDslEngine, NativeDslEngine};

#[tokio::test]
async fn registry_dispatches_toml_and_json_scripts_to_their_respective_engines() {
    let registry = DslEngineRegistry::new();
    registry.register(NativeDslEngine::new()).unwrap();
    registry.register(JsonDslEngine::new()).unwrap();
    assert_eq!(registry.engine_count(), 2);

    let toml_engine = registry.get_engine_for_extension("PIPELINE.TOML").expect("uppercase extension must still normalize");
    assert_eq!(toml_engine.descriptor().engine_id, "native");

    let json_engine = registry.get_engine_for_extension(".pipeline.json").expect("json extension must resolve");
    assert_eq!(json_engine.descriptor().engine_id, "json");

    let script = "[stage]\nname = \"build\"\n";
    let report = validate_and_log("build.pipeline.toml", script, &DslCompilationContext::default(), &DslExecutionContext::default());
    assert!(report.is_valid(), "a well-formed script must pass every validation layer: {:?}", report.issues);

    let compiled = toml_engine.compile(script, &DslCompilationContext::default()).await.unwrap();
    assert!(matches!(compiled, DslCompilationResult::Success { .. }));
}

#[tokio::test]
async fn unknown_extension_has_no_engine() {
    let registry = DslEngineRegistry::new();
    registry.register(NativeDslEngine::new()).unwrap();
    assert!(registry.get_engine_for_extension(".groovy").is_none());
}
