extern crate datalog;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use datalog::*;
use shared::{Fact, InMemoryDataSource, Literal, PositiveLiteral, Predicate, Rule, SourceDeclaration, Statement, Term};

#[cfg(test)]
mod tests {
    use super::*;

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    fn x() -> Term {
        Term::universal("X").unwrap()
    }

    fn pred(name: &str) -> Predicate {
        Predicate::new(name, 1).unwrap()
    }

    fn fact(name: &str, constant: &str) -> Fact {
        Fact::new(pred(name), vec![c(constant)]).unwrap()
    }

    fn rule(head: &str, body: &str) -> Rule {
        Rule::from_literals(
            vec![PositiveLiteral::new(pred(head), vec![x()]).unwrap()],
            vec![Literal::positive(pred(body), vec![x()]).unwrap()],
        )
        .unwrap()
    }

    fn query(name: &str) -> PositiveLiteral {
        PositiveLiteral::new(pred(name), vec![x()]).unwrap()
    }

    fn setup(statements: Vec<Statement>) -> (Rc<RefCell<KnowledgeBase>>, Reasoner) {
        let kb = Rc::new(RefCell::new(KnowledgeBase::new()));
        kb.borrow_mut().add_statements(statements);
        let reasoner = Reasoner::new(kb.clone());
        (kb, reasoner)
    }

    fn with_rule() -> Vec<Statement> {
        vec![fact("q", "a").into(), fact("q", "b").into(), rule("p", "q").into()]
    }

    /// Drives a fresh reasoner into `state`.
    fn reasoner_in(state: ReasonerState) -> (Rc<RefCell<KnowledgeBase>>, Reasoner) {
        let (kb, mut reasoner) = setup(with_rule());
        match state {
            ReasonerState::NotLoaded => {}
            ReasonerState::Loaded => reasoner.load().unwrap(),
            ReasonerState::Materialised => {
                reasoner.evaluate().unwrap();
            }
            ReasonerState::Changed => {
                reasoner.load().unwrap();
                kb.borrow_mut().add_statement(fact("q", "c"));
            }
            ReasonerState::Closed => reasoner.close(),
        }
        assert_eq!(reasoner.state(), state);
        (kb, reasoner)
    }

    #[test]
    fn starts_not_loaded_and_refuses_queries() {
        let (_kb, reasoner) = setup(with_rule());
        assert_eq!(reasoner.state(), ReasonerState::NotLoaded);
        let err = reasoner.answer_query(&query("p"), false).unwrap_err();
        assert_eq!(
            err,
            ReasonerError::State {
                operation: "answer a query",
                state: ReasonerState::NotLoaded
            }
        );
    }

    #[test]
    fn knowledge_base_without_rules_is_complete_after_load() {
        let (_kb, mut reasoner) = setup(vec![fact("p", "a").into(), fact("q", "b").into()]);
        reasoner.load().unwrap();
        assert_eq!(reasoner.state(), ReasonerState::Loaded);
        assert_eq!(reasoner.correctness(), Correctness::SoundAndComplete);

        let answers = reasoner.answer_query(&query("p"), false).unwrap();
        assert_eq!(answers.answers(), &[vec![c("a")]]);
        assert_eq!(answers.correctness(), Correctness::SoundAndComplete);
    }

    #[test]
    fn bridging_rules_alone_make_load_incomplete() {
        let source = Arc::new(InMemoryDataSource::new("p", vec![vec![c("s")]]).unwrap());
        let (_kb, mut reasoner) = setup(vec![
            fact("p", "a").into(),
            SourceDeclaration::new(pred("p"), source).into(),
        ]);
        reasoner.load().unwrap();
        assert_eq!(reasoner.correctness(), Correctness::SoundButIncomplete);

        assert!(reasoner.evaluate().unwrap());
        assert_eq!(reasoner.correctness(), Correctness::SoundAndComplete);
        assert_eq!(reasoner.count_query_answers(&query("p"), false).unwrap().count, 2);
    }

    #[test]
    fn evaluate_loads_implicitly_and_completes() {
        let (_kb, mut reasoner) = setup(with_rule());
        assert!(reasoner.evaluate().unwrap());
        assert_eq!(reasoner.state(), ReasonerState::Materialised);
        assert_eq!(reasoner.correctness(), Correctness::SoundAndComplete);

        let answers = reasoner.answer_query(&query("p"), false).unwrap();
        assert_eq!(answers.len(), 2);
        assert!(answers.contains(&[c("b")]));
    }

    #[test]
    fn load_is_a_no_op_once_loaded() {
        let (_kb, mut reasoner) = reasoner_in(ReasonerState::Materialised);
        reasoner.load().unwrap();
        assert_eq!(reasoner.state(), ReasonerState::Materialised);
        assert_eq!(reasoner.correctness(), Correctness::SoundAndComplete);
    }

    #[test]
    fn mutation_after_load_downgrades_to_incorrect() {
        for state in [ReasonerState::Loaded, ReasonerState::Materialised] {
            let (kb, reasoner) = reasoner_in(state);
            kb.borrow_mut().add_statement(fact("q", "z"));
            assert_eq!(reasoner.state(), ReasonerState::Changed);
            assert_eq!(reasoner.correctness(), Correctness::Incorrect);

            // still queryable, but flagged
            let answers = reasoner.answer_query(&query("q"), false).unwrap();
            assert_eq!(answers.correctness(), Correctness::Incorrect);
        }

        let (kb, reasoner) = reasoner_in(ReasonerState::Materialised);
        kb.borrow_mut().remove_statement(&fact("q", "a").into());
        assert_eq!(reasoner.state(), ReasonerState::Changed);
        assert_eq!(reasoner.correctness(), Correctness::Incorrect);
    }

    #[test]
    fn mutation_before_load_changes_nothing() {
        let (kb, reasoner) = reasoner_in(ReasonerState::NotLoaded);
        kb.borrow_mut().add_statement(fact("q", "z"));
        assert_eq!(reasoner.state(), ReasonerState::NotLoaded);
        assert_eq!(reasoner.correctness(), Correctness::SoundAndComplete);
    }

    #[test]
    fn no_op_mutation_keeps_state() {
        let (kb, reasoner) = reasoner_in(ReasonerState::Materialised);
        assert!(!kb.borrow_mut().add_statement(fact("q", "a")));
        assert_eq!(reasoner.state(), ReasonerState::Materialised);
    }

    #[test]
    fn reload_after_change_sees_new_statements() {
        let (kb, mut reasoner) = reasoner_in(ReasonerState::Changed);
        assert!(matches!(reasoner.evaluate(), Err(ReasonerError::State { .. })));

        reasoner.load().unwrap();
        assert_eq!(reasoner.state(), ReasonerState::Loaded);
        assert_eq!(reasoner.correctness(), Correctness::SoundButIncomplete);
        assert!(reasoner.evaluate().unwrap());
        assert_eq!(reasoner.count_query_answers(&query("p"), false).unwrap().count, 3);

        kb.borrow_mut().remove_statement(&rule("p", "q").into());
        reasoner.load().unwrap();
        assert_eq!(reasoner.correctness(), Correctness::SoundAndComplete);
        assert_eq!(reasoner.count_query_answers(&query("p"), false).unwrap().count, 0);
    }

    #[test]
    fn closed_is_terminal_from_every_state() {
        let states = [
            ReasonerState::NotLoaded,
            ReasonerState::Loaded,
            ReasonerState::Materialised,
            ReasonerState::Changed,
            ReasonerState::Closed,
        ];
        for state in states {
            let (kb, mut reasoner) = reasoner_in(state);
            reasoner.close();
            reasoner.close();
            assert_eq!(reasoner.state(), ReasonerState::Closed);
            assert_eq!(kb.borrow().listener_count(), 0);

            let closed = |result: ReasonerError| {
                assert!(
                    matches!(result, ReasonerError::State { state: ReasonerState::Closed, .. }),
                    "unexpected error {:?}",
                    result
                )
            };
            closed(reasoner.load().unwrap_err());
            closed(reasoner.evaluate().unwrap_err());
            closed(reasoner.reset().unwrap_err());
            closed(reasoner.answer_query(&query("p"), false).unwrap_err());
            closed(reasoner.count_query_answers(&query("p"), false).unwrap_err());
            closed(reasoner.inferences().unwrap_err());
            closed(reasoner.set_reasoning_timeout(Some(1)).unwrap_err());
            closed(reasoner.set_algorithm(Algorithm::SkolemChase).unwrap_err());

            // detached: edits no longer reach the reasoner
            kb.borrow_mut().add_statement(fact("q", "late"));
            assert_eq!(reasoner.state(), ReasonerState::Closed);
        }
    }

    #[test]
    fn closed_error_names_operation_and_state() {
        let (_kb, mut reasoner) = reasoner_in(ReasonerState::Loaded);
        reasoner.close();
        let err = reasoner.load().unwrap_err();
        assert_eq!(err.to_string(), "Cannot load while the reasoner is in state CLOSED");
    }

    #[test]
    fn dropping_the_reasoner_unregisters_it() {
        let (kb, reasoner) = reasoner_in(ReasonerState::Loaded);
        assert_eq!(kb.borrow().listener_count(), 1);
        drop(reasoner);
        assert_eq!(kb.borrow().listener_count(), 0);
    }

    #[test]
    fn reset_returns_to_not_loaded() {
        let (_kb, mut reasoner) = reasoner_in(ReasonerState::Materialised);
        reasoner.reset().unwrap();
        assert_eq!(reasoner.state(), ReasonerState::NotLoaded);
        assert!(reasoner.classification().is_none());
        assert!(reasoner.inferences().is_err());
    }

    #[test]
    fn zero_timeout_interrupts_evaluation() {
        let (_kb, mut reasoner) = setup(with_rule());
        reasoner.set_reasoning_timeout(Some(0)).unwrap();
        assert!(!reasoner.evaluate().unwrap());
        assert_eq!(reasoner.state(), ReasonerState::Materialised);
        assert_eq!(reasoner.correctness(), Correctness::SoundButIncomplete);

        let answers = reasoner.answer_query(&query("p"), false).unwrap();
        assert_eq!(answers.correctness(), Correctness::SoundButIncomplete);

        reasoner.set_reasoning_timeout(None).unwrap();
        assert!(reasoner.evaluate().unwrap());
        assert_eq!(reasoner.correctness(), Correctness::SoundAndComplete);
    }

    #[test]
    fn unrepresentable_timeout_runs_to_completion() {
        let (_kb, mut reasoner) = setup(with_rule());
        reasoner.set_reasoning_timeout(Some(u64::MAX)).unwrap();
        assert!(reasoner.evaluate().unwrap());
        assert_eq!(reasoner.state(), ReasonerState::Materialised);
        assert_eq!(reasoner.correctness(), Correctness::SoundAndComplete);
    }

    #[test]
    fn incompatible_arity_is_recoverable() {
        let wide = Predicate::new("edge", 2).unwrap();
        let narrow_source = Arc::new(InMemoryDataSource::new("edges", vec![vec![c("a")]]).unwrap());
        let bad: Statement = SourceDeclaration::new(wide.clone(), narrow_source).into();
        let (kb, mut reasoner) = setup(vec![bad.clone()]);

        let err = reasoner.load().unwrap_err();
        assert_eq!(
            err,
            ReasonerError::IncompatibleArity {
                predicate: wide.clone(),
                expected: 2,
                observed: 1
            }
        );
        assert_eq!(reasoner.state(), ReasonerState::NotLoaded);

        let fixed_source = Arc::new(InMemoryDataSource::new("edges", vec![vec![c("a"), c("b")]]).unwrap());
        kb.borrow_mut().remove_statement(&bad);
        kb.borrow_mut().add_statement(SourceDeclaration::new(wide.clone(), fixed_source));
        reasoner.load().unwrap();

        let edges = PositiveLiteral::new(wide, vec![x(), Term::universal("Y").unwrap()]).unwrap();
        assert_eq!(reasoner.count_query_answers(&edges, false).unwrap().count, 1);
    }

    #[test]
    fn inferences_hide_alias_predicates() {
        let (_kb, mut reasoner) = setup(vec![
            fact("p", "a").into(),
            fact("q", "b").into(),
            rule("p", "q").into(),
        ]);
        reasoner.evaluate().unwrap();
        let inferences = reasoner.inferences().unwrap();
        let names: Vec<&str> = inferences.facts().iter().map(|f| f.predicate().name()).collect();
        assert_eq!(names, vec!["p", "p", "q"]);
        assert_eq!(inferences.correctness(), Correctness::SoundAndComplete);
    }
}
