//! Statement-level recovery, interrupts and the interpreter task queue.

use std::thread;

use pretty_assertions::assert_eq;
use tessa_eval::{EvalConfig, EventQueue, InterruptFlag, QueueClosed};
use tessa_ir::{BinaryOp, Span};
use tessa_tree::Expr;
use tessa_value::Value;

use crate::common::{assign, call, constant, evaluator, id, mat, num, program, quiet, shown};

#[test]
fn errors_abort_only_their_statement() {
    let (mut eval, out) = evaluator(EvalConfig::new());
    let nonconformant = Expr::binary(
        BinaryOp::Add,
        constant(mat(&[&[1.0, 2.0]])),
        constant(mat(&[&[1.0, 2.0, 3.0]])),
        Span::new(2, 7),
    );
    let summary = eval.run(&program(vec![
        shown(assign("a", num(1.0))),
        shown(Expr::assign(
            id("b"),
            tessa_ir::AssignOp::Assign,
            nonconformant,
            Span::new(2, 1),
        )),
        quiet(call("lu", vec![])),
        shown(assign("c", num(3.0))),
    ]));
    assert_eq!((summary.executed, summary.failed), (2, 2));
    assert!(!eval.env().contains("b"));
    assert_eq!(
        out.captured(),
        "a = 1\n\
         error: operator +: nonconformant arguments (op1 is 1x2, op2 is 1x3) near line 2, column 7\n\
         error: lu: expecting [L, U, P] = lu (A) or lu (A, \"vector\")\n\
         c = 3\n"
    );
}

#[test]
fn abort_on_error_keeps_earlier_results() {
    let (mut eval, _) = evaluator(EvalConfig::new().abort_on_error(true));
    let summary = eval.run(&program(vec![
        quiet(assign("a", num(1.0))),
        quiet(id("missing")),
        quiet(assign("c", num(3.0))),
    ]));
    assert_eq!((summary.executed, summary.failed), (1, 1));
    assert_eq!(eval.env().get("a"), Some(&Value::scalar(1.0)));
    assert!(!eval.env().contains("c"));
}

#[test]
fn interrupt_from_another_thread() {
    let flag = InterruptFlag::new();
    let (mut eval, _) = evaluator(EvalConfig::new().interrupt(flag.clone()));
    let remote = flag.clone();
    thread::spawn(move || remote.raise()).join().unwrap();

    let summary = eval.run(&program(vec![quiet(assign("a", num(1.0)))]));
    assert!(summary.interrupted);
    assert!(!flag.is_raised());
    assert!(eval.env().is_empty());
}

#[test]
fn tasks_posted_from_threads_run_on_drain() {
    let queue = EventQueue::new();
    let (mut eval, _) = evaluator(EvalConfig::new());

    let producers: Vec<_> = (0..4_u32)
        .map(|i| {
            let sender = queue.sender();
            thread::spawn(move || {
                sender
                    .post(move |eval| {
                        eval.env_mut().set(format!("t{i}"), Value::scalar(f64::from(i)));
                    })
                    .unwrap();
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    assert_eq!(queue.pending(), 4);
    assert_eq!(queue.drain(&mut eval), 4);
    assert!(queue.is_empty());
    for i in 0..4_u32 {
        assert_eq!(eval.env().get(&format!("t{i}")), Some(&Value::scalar(f64::from(i))));
    }
}

#[test]
fn tasks_can_run_statements_and_post_more_work() {
    let queue = EventQueue::new();
    let (mut eval, out) = evaluator(EvalConfig::new());
    let again = queue.sender();
    queue
        .sender()
        .post(move |eval| {
            eval.run(&program(vec![shown(assign("x", num(2.0)))]));
            again
                .post(|eval| {
                    eval.run(&program(vec![shown(assign(
                        "x",
                        Expr::binary(BinaryOp::ElMul, id("x"), num(5.0), Span::UNKNOWN),
                    ))]));
                })
                .unwrap();
        })
        .unwrap();

    assert_eq!(queue.drain(&mut eval), 2);
    assert_eq!(out.captured(), "x = 2\nx = 10\n");
}

#[test]
fn posting_after_the_queue_is_gone_fails() {
    let queue = EventQueue::new();
    let sender = queue.sender();
    drop(queue);
    assert_eq!(sender.post(|_| {}), Err(QueueClosed));
}
