use msgring::MessageRing;

fn main() {
    let ring = MessageRing::new(3);

    ring.push("a");
    ring.push("b");
    println!("drained: {:?}", ring.drain_batch(1));

    // The ring holds b, c, d; pushing e evicts b.
    ring.push("c");
    ring.push("d");
    ring.push("e");
    println!("full: {}, len: {}", ring.is_full(), ring.len());
    println!("drained: {:?}", ring.drain_batch(10));
    println!("stats: {:?}", ring.stats());
}
