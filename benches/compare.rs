use std::collections::VecDeque;
use std::sync::Arc;

use divan;
use implbox::intent::emplace;
use implbox::space::*;
use implbox::{upcast, ImplBox};

fn main() {
    divan::main();
}

trait Message {
    fn weight(&self) -> usize;
}

impl<const N: usize> Message for [u8; N] {
    fn weight(&self) -> usize {
        self.len()
    }
}

const ROUNDS: usize = 64;

fn drain<'a, M: std::ops::Deref<Target = dyn Message + 'a>>(queue: &mut VecDeque<M>) -> usize {
    let mut total = 0;
    while let Some(msg) = queue.pop_front() {
        total += msg.weight();
    }
    total
}

#[divan::bench]
fn implbox_small_item_small_space() {
    divan::black_box({
        let small: ImplBox<dyn Message, S1> = ImplBox::new(divan::black_box([0u8; 4]), upcast!());
        small
    });
}

#[divan::bench]
fn implbox_small_item_large_space() {
    divan::black_box({
        let small: ImplBox<dyn Message, S64> = ImplBox::new(divan::black_box([0u8; 4]), upcast!());
        small
    });
}

#[divan::bench]
fn implbox_large_item_small_space() {
    divan::black_box({
        let large: ImplBox<dyn Message, S1> = ImplBox::new(divan::black_box([0u8; 512]), upcast!());
        large
    });
}

#[divan::bench]
fn implbox_large_item_large_space() {
    divan::black_box({
        let large: ImplBox<dyn Message, S64> =
            ImplBox::new(divan::black_box([0u8; 512]), upcast!());
        large
    });
}

#[divan::bench]
fn box_small_item() {
    divan::black_box({
        let small: Box<dyn Message> = Box::new(divan::black_box([0u8; 4]));
        small
    });
}

#[divan::bench]
fn box_large_item() {
    divan::black_box({
        let large: Box<dyn Message> = Box::new(divan::black_box([0u8; 512]));
        large
    });
}

#[divan::bench(consts = [8, 64, 512])]
fn implbox_queue<const N: usize>() -> usize {
    let mut queue: VecDeque<ImplBox<dyn Message>> = VecDeque::with_capacity(ROUNDS);
    for _ in 0..ROUNDS {
        queue.push_back(ImplBox::new(divan::black_box([0u8; N]), upcast!()));
    }
    drain(&mut queue)
}

#[divan::bench(consts = [8, 64, 512])]
fn implbox_emplace_queue<const N: usize>() -> usize {
    let mut queue: VecDeque<ImplBox<dyn Message, S8>> = VecDeque::with_capacity(ROUNDS);
    for _ in 0..ROUNDS {
        queue.push_back(ImplBox::resolve(emplace(|| divan::black_box([0u8; N])), upcast!()));
    }
    drain(&mut queue)
}

#[divan::bench(consts = [8, 64, 512])]
fn box_queue<const N: usize>() -> usize {
    let mut queue: VecDeque<Box<dyn Message>> = VecDeque::with_capacity(ROUNDS);
    for _ in 0..ROUNDS {
        queue.push_back(Box::new(divan::black_box([0u8; N])));
    }
    drain(&mut queue)
}

#[divan::bench]
fn implbox_shared() -> usize {
    let shared: Arc<[u8; 512]> = Arc::new([0; 512]);
    let mut queue: VecDeque<ImplBox<dyn Message>> = VecDeque::with_capacity(ROUNDS);
    for _ in 0..ROUNDS {
        queue.push_back(ImplBox::resolve(divan::black_box(shared.clone()), upcast!()));
    }
    drain(&mut queue)
}

#[divan::bench]
fn implbox_reference() -> usize {
    let mut backing = [[0u8; 512]; 4];
    let mut queue: VecDeque<ImplBox<dyn Message>> = VecDeque::with_capacity(backing.len());
    for msg in backing.iter_mut() {
        queue.push_back(ImplBox::borrowed(divan::black_box(msg), upcast!()));
    }
    drain(&mut queue)
}
