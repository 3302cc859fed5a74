use criterion::{Criterion, black_box, criterion_group, criterion_main};
use larch::parse;

/// Generate a realistic Python module exercising every statement form the
/// parser supports: imports, definitions, control flow, comprehensions,
/// f-strings, and slicing.
fn make_python_module(index: usize) -> String {
    format!(
        r#"
import os
import sys
from pathlib import Path
from collections import OrderedDict

CONSTANT_{i} = {i}
TABLE_{i}: dict[str, int] = {{"a": 1, "b": 2}}


def scale_{i}(values, factor=2, *rest, clamp=None, **options):
    result = [v * factor for v in values if v > 0]
    window = result[1:5:2]
    label = f"scaled {{len(result)!r:>6}} items"
    if clamp is not None and len(window) > 0:
        result = [min(v, clamp) for v in result]
    elif not result:
        result = list(rest)
    return result, label


class Pipeline_{i}:
    def __init__(self, steps, *, name="pipeline"):
        self.steps = steps
        self.name = name

    def run(self, payload):
        for step in self.steps:
            try:
                payload = step(payload)
            except ValueError as exc:
                raise RuntimeError(f"step failed: {{exc}}") from exc
            else:
                continue
        else:
            return payload


async def fetch_{i}(client, urls):
    async with client.session() as session:
        results = {{url: await session.get(url) for url in urls}}
    return results


def main_{i}():
    total = 0
    items = Pipeline_{i}([scale_{i}], name=f"run-{{CONSTANT_{i}}}")
    while total < 100:
        total += CONSTANT_{i} or 1
        if total % 7 == 0:
            continue
    with open(os.devnull) as sink:
        sink.write(str(total))
    assert total >= 100, "accumulation underflow"
    return total


if __name__ == "__main__":
    sys.exit(main_{i}())
"#,
        i = index
    )
}

fn bench_parse(c: &mut Criterion) {
    // One mid-sized module.
    let module = make_python_module(0);
    c.bench_function("parse_single_module", |b| {
        b.iter(|| {
            let tree = parse(black_box(&module)).unwrap();
            black_box(tree);
        });
    });

    // A single large file: 200 modules concatenated.
    let big_source: String = (0..200)
        .map(make_python_module)
        .collect::<Vec<_>>()
        .join("\n");
    c.bench_function("parse_single_large_file", |b| {
        b.iter(|| {
            let tree = parse(black_box(&big_source)).unwrap();
            black_box(tree);
        });
    });

    // Failure path: the error is near the end, so the whole prefix is lexed
    // and parsed before aborting.
    let mut failing = make_python_module(1);
    failing.push_str("\nbroken = (1 +\n");
    c.bench_function("parse_failure_path", |b| {
        b.iter(|| {
            let err = parse(black_box(&failing)).unwrap_err();
            black_box(err);
        });
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
