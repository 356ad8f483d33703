use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::prelude::*;
use rbtree::RBTree;
use redwood::{NodeIndex, Redwood, SubtreeSize};
use std::collections::BTreeSet;
use std::ops::Range;

fn bench_baseline_multi_insertions(data: Vec<usize>) {
    let mut tree = BTreeSet::new();

    for i in data {
        tree.insert(i);
    }
}

fn bench_multi_insertions(data: Vec<usize>) {
    let mut tree = Redwood::<usize>::new();

    for i in data {
        tree.insert_key(i);
    }
}

fn bench_multi_insertions_hint(data: Vec<usize>) {
    let mut tree = Redwood::<usize>::new();
    tree.reserve(data.len());

    for i in data {
        tree.insert_key(i);
    }
}

fn init_large_btree() -> BTreeSet<usize> {
    let mut tree = BTreeSet::new();

    for i in random_insertion_order() {
        tree.insert(i);
    }

    tree
}

fn init_large_redwood_tree() -> Redwood<usize> {
    let mut tree = Redwood::<usize>::new();

    for i in random_insertion_order() {
        tree.insert_key(i);
    }

    tree
}

fn init_large_sized_tree() -> Redwood<usize, SubtreeSize> {
    let mut tree = Redwood::<usize, SubtreeSize>::new();

    for i in random_insertion_order() {
        tree.insert_key(i);
    }

    tree
}

fn bench_select(tree: Redwood<usize, SubtreeSize>, ranks: Vec<usize>) {
    for rank in ranks {
        assert_eq!(tree.key(tree.select(rank)), Some(&rank));
    }
}

fn bench_baseline_select(tree: BTreeSet<usize>, ranks: Vec<usize>) {
    for rank in ranks {
        assert_eq!(tree.iter().nth(rank), Some(&rank));
    }
}

fn bench_rank(tree: Redwood<usize, SubtreeSize>, handles: Vec<(NodeIndex, usize)>) {
    for (node, key) in handles {
        assert_eq!(tree.rank(node), key);
    }
}

fn sized_tree_with_handles(
    count: usize,
) -> (Redwood<usize, SubtreeSize>, Vec<(NodeIndex, usize)>) {
    let tree = init_large_sized_tree();
    let handles = init_random_data(count, None)
        .into_iter()
        .map(|key| (tree.search(&key), key))
        .collect();

    (tree, handles)
}

fn redwood_tree_with_handles(count: usize) -> (Redwood<usize>, Vec<NodeIndex>) {
    let tree = init_large_redwood_tree();
    let mut keys = init_random_data(count, None);
    keys.sort_unstable();
    keys.dedup();

    // ascending order: a removal only releases the slot of a smaller key, never a pending one
    let handles = keys.into_iter().map(|key| tree.search(&key)).collect();

    (tree, handles)
}

fn bench_handle_deletions(mut tree: Redwood<usize>, handles: Vec<NodeIndex>) {
    for node in handles {
        assert!(tree.delete_node(node).is_ok());
    }
}

fn successor_walk(tree: Redwood<usize>) {
    let mut node = tree.minimum().unwrap();
    let mut expected = 0;

    while node != tree.nil() {
        assert_eq!(tree.key(node), Some(&expected));
        expected += 1;
        node = tree.successor(node);
    }
}

fn init_large_rbtree() -> RBTree<usize, ()> {
    let mut tree = RBTree::new();

    for i in random_insertion_order() {
        tree.insert(i, ());
    }

    tree
}

fn bench_rbtree_random_deletions(mut tree: RBTree<usize, ()>, indices: Vec<usize>) {
    for idx in indices {
        tree.remove(&idx);
    }
}

fn random_insertion_order() -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let mut indices: Vec<usize> = (0..100000).collect();

    indices.shuffle(&mut rng);

    indices
}

fn init_random_data(count: usize, range_opt: Option<Range<usize>>) -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let range = range_opt.unwrap_or(0..100000);
    let range = rand::distributions::Uniform::new(range.start, range.end);

    let indices: Vec<usize> = (0..count).map(|_| rng.sample(&range)).collect();

    indices
}

fn bench_baseline_random_deletions(mut tree: BTreeSet<usize>, indices: Vec<usize>) {
    for idx in indices {
        tree.remove(&idx);
    }
}

fn bench_random_deletions(mut tree: Redwood<usize>, indices: Vec<usize>) {
    for idx in indices {
        let _ = tree.delete_key(&idx);
    }
}

fn bench_baseline_random_lookups(tree: BTreeSet<usize>, indices: Vec<usize>) {
    for idx in indices {
        assert!(tree.contains(&idx));
    }
}

fn bench_random_lookups(tree: Redwood<usize>, indices: Vec<usize>) {
    for idx in indices {
        assert!(tree.contains(&idx));
    }
}

fn inorder_iteration_btree(tree: BTreeSet<usize>) {
    for (i, &elem) in tree.iter().enumerate() {
        assert_eq!(i, elem);
    }
}

fn inorder_iteration(tree: Redwood<usize>) {
    for (i, &elem) in tree.iter().enumerate() {
        assert_eq!(i, elem);
    }
}

mod insert_delete {
    use super::*;
    use redwood::Redwood;

    pub fn bench_insert_delete(
        mut tree: Redwood<usize>,
        insertions: &Vec<usize>,
        deletions: &Vec<usize>,
    ) {
        for idx in 0..deletions.len() {
            let _ = tree.delete_key(&deletions[idx]);
        }
        for idx in 0..insertions.len() {
            tree.insert_key(insertions[idx]);
        }
    }

    pub fn bench_baseline_insert_delete(
        mut tree: BTreeSet<usize>,
        insertions: &Vec<usize>,
        deletions: &Vec<usize>,
    ) {
        for idx in 0..deletions.len() {
            tree.remove(&deletions[idx]);
        }
        for idx in 0..insertions.len() {
            tree.insert(insertions[idx]);
        }
    }
}

fn redwood_tree_benchmark(c: &mut Criterion) {
    c.bench_function("baseline tree insert delete", |b| {
        b.iter_batched(
            || {
                (
                    init_large_btree(),
                    init_random_data(2000, Some(100000..300000)),
                    init_random_data(2000, Some(0..100000)),
                )
            },
            |(tree, holes, to_insert)| {
                insert_delete::bench_baseline_insert_delete(tree, &holes, &to_insert)
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree insert delete", |b| {
        b.iter_batched(
            || {
                (
                    init_large_redwood_tree(),
                    init_random_data(2000, Some(100000..300000)),
                    init_random_data(2000, Some(0..100000)),
                )
            },
            |(tree, holes, to_insert)| insert_delete::bench_insert_delete(tree, &holes, &to_insert),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline tree 100K insertions", |b| {
        b.iter_batched(
            || random_insertion_order(),
            |order| bench_baseline_multi_insertions(order),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree 100K insertions", |b| {
        b.iter_batched(
            || random_insertion_order(),
            |order| bench_multi_insertions(order),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree 100K insertions with size hint", |b| {
        b.iter_batched(
            || random_insertion_order(),
            |order| bench_multi_insertions_hint(order),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline tree random lookups", |b| {
        b.iter_batched(
            || (init_large_btree(), init_random_data(5000, None)),
            |(tree, indices)| bench_baseline_random_lookups(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree random lookups", |b| {
        b.iter_batched(
            || (init_large_redwood_tree(), init_random_data(5000, None)),
            |(tree, indices)| bench_random_lookups(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline tree random deletions", |b| {
        b.iter_batched(
            || (init_large_btree(), init_random_data(5000, None)),
            |(tree, indices)| bench_baseline_random_deletions(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree random deletions", |b| {
        b.iter_batched(
            || (init_large_redwood_tree(), init_random_data(5000, None)),
            |(tree, indices)| bench_random_deletions(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("rbtree crate random deletions", |b| {
        b.iter_batched(
            || (init_large_rbtree(), init_random_data(5000, None)),
            |(tree, indices)| bench_rbtree_random_deletions(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree random select", |b| {
        b.iter_batched(
            || (init_large_sized_tree(), init_random_data(5000, None)),
            |(tree, ranks)| bench_select(tree, ranks),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline tree random select", |b| {
        b.iter_batched(
            || (init_large_btree(), init_random_data(200, None)),
            |(tree, ranks)| bench_baseline_select(tree, ranks),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree random rank", |b| {
        b.iter_batched(
            || sized_tree_with_handles(5000),
            |(tree, handles)| bench_rank(tree, handles),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree random deletions by handle", |b| {
        b.iter_batched(
            || redwood_tree_with_handles(5000),
            |(tree, handles)| bench_handle_deletions(tree, handles),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree successor walk", |b| {
        b.iter_batched(
            || init_large_redwood_tree(),
            |tree| successor_walk(tree),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tree inorder iteration", |b| {
        b.iter_batched(
            || init_large_redwood_tree(),
            |tree| inorder_iteration(tree),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline tree inorder iteration", |b| {
        b.iter_batched(
            || init_large_btree(),
            |tree| inorder_iteration_btree(tree),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, redwood_tree_benchmark);
criterion_main!(benches);
