//! Pipeline tests for the batch orchestrator

#[cfg(test)]
mod tests {
    use crate::{
        BatchConfig, BatchOrchestrator, Document, ItemOutcome, Stage, pending_documents,
    };
    use docsift_domain::TextExtractor;
    use docsift_llm::{LlmError, MockProvider};
    use docsift_store::{Accumulator, CsvExporter, Ledger, MergeOutcome, ResultStore};
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Serves document text from memory, keyed by file name
    #[derive(Default)]
    struct MemoryExtractor {
        texts: HashMap<String, Result<String, String>>,
    }

    impl MemoryExtractor {
        fn with(mut self, id: &str, text: Result<&str, &str>) -> Self {
            self.texts
                .insert(id.to_string(), text.map(str::to_string).map_err(str::to_string));
            self
        }
    }

    impl TextExtractor for MemoryExtractor {
        type Error = String;

        fn extract_text(&self, path: &Path) -> Result<String, String> {
            let id = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            self.texts
                .get(id)
                .cloned()
                .unwrap_or_else(|| Err(format!("no such document: {}", id)))
        }
    }

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            path: PathBuf::from("inputs").join(id),
        }
    }

    fn config() -> BatchConfig {
        BatchConfig::new("Return JSON with title and biases.")
    }

    fn ledger_in(dir: &Path) -> Ledger {
        Ledger::load(dir.join("processed.json")).unwrap()
    }

    #[test]
    fn test_full_flow_produces_tagged_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut llm = MockProvider::default();
        llm.add_response("alpha text", "```json\n{\"title\": \"Alpha\", \"biases\": \"anchoring, framing\"}\n```");
        llm.add_response("beta text", "Result: {\"title\": \"Beta\", \"biases\": []}");

        let extractor = MemoryExtractor::default()
            .with("a.pdf", Ok("alpha text"))
            .with("b.pdf", Ok("beta text"));
        let orchestrator = BatchOrchestrator::new(llm, extractor, &config());
        let mut ledger = ledger_in(dir.path());

        let report = orchestrator.run(&[doc("a.pdf"), doc("b.pdf")], &mut ledger);

        assert_eq!(report.processed(), 2);
        assert_eq!(report.skipped(), 0);
        assert_eq!(
            serde_json::to_value(&report.records[0]).unwrap(),
            json!({"title": "Alpha", "biases": ["anchoring", "framing"], "source_id": "a.pdf"})
        );
        assert_eq!(report.records[1].source_id("source_id"), Some("b.pdf"));
        assert!(ledger.is_done("a.pdf"));
        assert!(ledger.is_done("b.pdf"));
    }

    #[test]
    fn test_prompt_is_instruction_plus_text() {
        let dir = tempfile::tempdir().unwrap();
        let llm = MockProvider::new("{}");
        let extractor = MemoryExtractor::default().with("a.pdf", Ok("BODY"));
        let orchestrator = BatchOrchestrator::new(llm, extractor, &config());

        orchestrator.run(&[doc("a.pdf")], &mut ledger_in(dir.path()));

        assert_eq!(
            orchestrator.llm().prompts(),
            vec!["Return JSON with title and biases.\n\nDocument text:\nBODY"]
        );
    }

    #[test]
    fn test_ledger_entries_never_reach_the_service() {
        let dir = tempfile::tempdir().unwrap();
        let llm = MockProvider::new(r#"{"title": "x"}"#);
        let extractor = MemoryExtractor::default()
            .with("a.pdf", Ok("alpha"))
            .with("b.pdf", Ok("beta"));
        let orchestrator = BatchOrchestrator::new(llm, extractor, &config());

        let mut ledger = ledger_in(dir.path());
        ledger.mark_done("a.pdf");

        let report = orchestrator.run(&[doc("a.pdf"), doc("b.pdf")], &mut ledger);

        assert_eq!(orchestrator.llm().call_count(), 1);
        assert!(orchestrator.llm().prompts()[0].ends_with("beta"));
        assert_eq!(
            report.outcomes[0],
            ItemOutcome::AlreadyDone { source_id: "a.pdf".into() }
        );
        assert_eq!(report.already_done(), 1);
    }

    #[test]
    fn test_failures_are_local_to_one_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut llm = MockProvider::new(r#"{"title": "ok"}"#);
        llm.add_error("call-fails", LlmError::Transport("connection reset".into()));
        llm.add_response("garbled", "I am unable to comply.");

        let extractor = MemoryExtractor::default()
            .with("1-unreadable.pdf", Err("encrypted"))
            .with("2-empty.pdf", Ok("  \n "))
            .with("3-call.pdf", Ok("call-fails"))
            .with("4-malformed.pdf", Ok("garbled"))
            .with("5-good.pdf", Ok("fine"));
        let orchestrator = BatchOrchestrator::new(llm, extractor, &config());
        let docs: Vec<_> = ["1-unreadable.pdf", "2-empty.pdf", "3-call.pdf", "4-malformed.pdf", "5-good.pdf"]
            .iter()
            .map(|id| doc(id))
            .collect();
        let mut ledger = ledger_in(dir.path());

        let report = orchestrator.run(&docs, &mut ledger);

        let stages: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| match o {
                ItemOutcome::Skipped { reason, .. } => reason.stage,
                _ => Stage::Done,
            })
            .collect();
        assert_eq!(
            stages,
            vec![Stage::Extracting, Stage::Extracting, Stage::Calling, Stage::Normalizing, Stage::Done]
        );

        match &report.outcomes[3] {
            ItemOutcome::Skipped { reason, .. } => {
                assert_eq!(reason.raw_reply.as_deref(), Some("I am unable to comply."));
                assert!(reason.message.contains("no object boundaries"));
            }
            other => panic!("expected skip, got {:?}", other),
        }

        assert_eq!(ledger.ids(), &["5-good.pdf".to_string()]);
        assert_eq!(report.records.len(), 1);
        // the empty document never reached the service
        assert_eq!(orchestrator.llm().call_count(), 3);
    }

    #[test]
    fn test_empty_reply_is_a_calling_failure() {
        let dir = tempfile::tempdir().unwrap();
        let llm = MockProvider::new("   ");
        let extractor = MemoryExtractor::default().with("a.pdf", Ok("x"));
        let orchestrator = BatchOrchestrator::new(llm, extractor, &config());

        let report = orchestrator.run(&[doc("a.pdf")], &mut ledger_in(dir.path()));
        match &report.outcomes[0] {
            ItemOutcome::Skipped { reason, .. } => assert_eq!(reason.stage, Stage::Calling),
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_source_id_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.source_id_field = "filename".into();
        let orchestrator = BatchOrchestrator::new(
            MockProvider::new(r#"{"t": 1}"#),
            MemoryExtractor::default().with("a.pdf", Ok("x")),
            &config,
        );

        let report = orchestrator.run(&[doc("a.pdf")], &mut ledger_in(dir.path()));
        assert_eq!(report.records[0].source_id("filename"), Some("a.pdf"));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results.jsonl");
        let ledger_path = dir.path().join("processed.json");
        let accumulator = Accumulator::new(ResultStore::new(&results))
            .with_exporter(CsvExporter::new(dir.path().join("results.csv")));

        let docs = vec![doc("a.pdf"), doc("b.pdf")];
        let extractor = || {
            MemoryExtractor::default()
                .with("a.pdf", Ok("alpha"))
                .with("b.pdf", Ok("beta"))
        };

        let first = BatchOrchestrator::new(MockProvider::new(r#"{"title": "t"}"#), extractor(), &config());
        let mut ledger = Ledger::load(&ledger_path).unwrap();
        let summary = first.run_and_persist(&docs, &mut ledger, &accumulator).unwrap();
        assert!(summary.merge.persisted());
        assert!(summary.exports.is_complete());
        assert_eq!(summary.exports.written, vec![dir.path().join("results.csv")]);
        assert_eq!(summary.ledger_size, 2);

        let results_after_first = fs::read_to_string(&results).unwrap();
        let ledger_after_first = fs::read_to_string(&ledger_path).unwrap();

        let second = BatchOrchestrator::new(MockProvider::new(r#"{"title": "t"}"#), extractor(), &config());
        let mut ledger = Ledger::load(&ledger_path).unwrap();
        let summary = second.run_and_persist(&docs, &mut ledger, &accumulator).unwrap();

        assert_eq!(second.llm().call_count(), 0);
        assert_eq!(summary.merge, MergeOutcome::NothingToPersist);
        assert!(summary.exports.written.is_empty());
        assert_eq!(summary.report.already_done(), 2);
        assert_eq!(fs::read_to_string(&results).unwrap(), results_after_first);
        assert_eq!(fs::read_to_string(&ledger_path).unwrap(), ledger_after_first);
    }

    #[test]
    fn test_ledger_saved_when_everything_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("processed.json");
        let accumulator = Accumulator::new(ResultStore::new(dir.path().join("results.jsonl")));
        let orchestrator = BatchOrchestrator::new(
            MockProvider::new("no json here"),
            MemoryExtractor::default().with("a.pdf", Ok("x")),
            &config(),
        );

        let mut ledger = Ledger::load(&ledger_path).unwrap();
        let summary = orchestrator
            .run_and_persist(&[doc("a.pdf")], &mut ledger, &accumulator)
            .unwrap();

        assert_eq!(summary.report.skipped(), 1);
        assert_eq!(summary.merge, MergeOutcome::NothingToPersist);
        assert_eq!(fs::read_to_string(&ledger_path).unwrap(), "[]");
        assert!(!dir.path().join("results.jsonl").exists());
    }

    #[test]
    fn test_pending_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(dir.path());
        ledger.mark_done("a.pdf");
        let docs = vec![doc("a.pdf"), doc("b.pdf")];
        let pending = pending_documents(&docs, &ledger);
        assert_eq!(pending, vec![&docs[1]]);
    }
}
