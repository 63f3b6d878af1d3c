use assist_core::{ChangeOperation, HighlightRange, LineDocument, apply_changes};
use std::collections::HashSet;

fn document(line_count: u8) -> LineDocument {
    LineDocument::from_lines((1..=line_count % 24).map(|n| format!("line {n}")))
}

/// Build operations whose reference lines are all distinct.
fn distinct_ops(line_count: usize, seeds: &[(u8, u8, u8)]) -> Vec<ChangeOperation> {
    let mut used = HashSet::new();
    let mut ops = Vec::new();
    for &(kind, line, span) in seeds {
        let start = i64::from(line) % (line_count as i64 + 2);
        if !used.insert(start) {
            continue;
        }
        let end = start + i64::from(span % 3);
        ops.push(match kind % 3 {
            0 => ChangeOperation::insert(start, format!("ins {start}")),
            1 => ChangeOperation::delete(start, end),
            _ => ChangeOperation::replace(start, end, format!("rep {start}\nrep {start}b")),
        });
    }
    ops
}

/// Reorder `items` by the generated `keys` (missing keys sort last, ties keep input order).
fn permute<T: Clone>(items: &[T], keys: &[u32]) -> Vec<T> {
    let mut order = (0..items.len()).collect::<Vec<_>>();
    order.sort_by_key(|&idx| (keys.get(idx).copied().unwrap_or(u32::MAX), idx));
    order.into_iter().map(|idx| items[idx].clone()).collect()
}

fn well_formed(ranges: &[HighlightRange]) -> bool {
    ranges
        .iter()
        .all(|r| r.start_line >= 1 && r.start_line <= r.end_line)
}

quickcheck::quickcheck! {
    fn prop_order_independent_for_distinct_reference_lines(
        line_count: u8,
        seeds: Vec<(u8, u8, u8)>,
        keys: Vec<u32>
    ) -> bool {
        let doc = document(line_count);
        let ops = distinct_ops(doc.line_count(), &seeds);
        let shuffled = permute(&ops, &keys);

        apply_changes(&doc, &ops) == apply_changes(&doc, &shuffled)
    }

    fn prop_insert_then_delete_round_trips(line_count: u8, at: i64, added: u8) -> bool {
        let doc = document(line_count);
        let content = (0..=added % 5).map(|n| format!("new {n}")).collect::<Vec<_>>().join("\n");

        let Some(inserted) = apply_changes(&doc, &[ChangeOperation::insert(at, content)]) else {
            return false;
        };
        let [range] = inserted.inserted.as_slice() else {
            return false;
        };
        let delete = ChangeOperation::delete(range.start_line as i64, range.end_line as i64);
        apply_changes(&inserted.document, &[delete])
            .is_some_and(|restored| restored.document.lines() == doc.lines())
    }

    fn prop_adversarial_lines_stay_in_bounds(line_count: u8, a: i64, b: i64, c: i64) -> bool {
        let doc = document(line_count);
        let ops = [
            ChangeOperation::replace(a, b, "r1\nr2"),
            ChangeOperation::delete(b, c),
            ChangeOperation::insert(c, "i"),
            ChangeOperation::delete(i64::MIN, i64::MAX),
        ];
        let Some(result) = apply_changes(&doc, &ops) else {
            return false;
        };
        result.document.line_count() <= doc.line_count() + 3
            && well_formed(&result.inserted)
            && well_formed(&result.touched)
    }

    fn prop_replace_on_empty_is_insert_at_line_one(start: i64, end: i64, lines: Vec<String>) -> bool {
        let content = lines.join("\n");
        let empty = LineDocument::empty();
        apply_changes(&empty, &[ChangeOperation::replace(start, end, content.clone())])
            == apply_changes(&empty, &[ChangeOperation::insert(1, content)])
    }
}

#[test]
fn test_insert_and_delete_against_original_lines() {
    let doc = LineDocument::from_lines(["a", "b", "c"]);
    let result = apply_changes(
        &doc,
        &[ChangeOperation::insert(2, "X"), ChangeOperation::delete(1, 1)],
    )
    .unwrap();

    assert_eq!(result.document.lines(), ["b", "X", "c"]);
    assert_eq!(result.inserted, vec![HighlightRange::new(2, 2)]);
    assert_eq!(result.touched, vec![HighlightRange::single(1)]);
}

#[test]
fn test_permute_reorders_by_keys() {
    assert_eq!(permute(&["a", "b", "c"], &[2, 0, 1]), ["b", "c", "a"]);
    assert_eq!(permute(&["a", "b", "c"], &[7, 3]), ["b", "a", "c"]);
    assert_eq!(permute(&["a", "b"], &[]), ["a", "b"]);
}

#[test]
fn test_empty_change_list_yields_nothing() {
    assert!(apply_changes(&LineDocument::from_lines(["a"]), &[]).is_none());
}
