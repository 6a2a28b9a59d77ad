use obdd_rs::bdd::Bdd;
use obdd_rs::expr::{Expr, ExprArena};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let bdd = Bdd::default();
    println!("bdd = {:?}", bdd);

    println!("zero = {}", bdd.zero());
    println!("one = {}", bdd.one());

    let x = bdd.var("x")?;
    let y = bdd.var("y")?;
    let a0 = bdd.var_indexed("a", 0)?;
    for v in bdd.vars() {
        println!("{} = {}", v, bdd.var_info(v));
    }

    let f = bdd.mk_var(x) & bdd.mk_var(y);
    println!("x & y = {}", f.to_bracket_string());
    let g = bdd.mk_var(y) & bdd.mk_var(x);
    println!("y & x = {} (same node: {})", g, f == g);

    let h = bdd.compile(&Expr::implies(Expr::var(x) ^ Expr::var(y), Expr::var(a0)));
    println!("(x ^ y) -> a[0] = {}", h);
    println!("  support = {:?}", h.support());
    println!("  models = {}", h.sat_count());
    for path in h.paths() {
        println!("  path {:?}", path);
    }

    let mut arena = ExprArena::new();
    let vx = arena.var(x);
    let vy = arena.var(y);
    let xy = arena.xor(vx, vy);
    let root = arena.and(xy, xy);
    let k = bdd.compile_arena(&arena, root)?;
    println!("arena (x ^ y) & (x ^ y) = {}", k);
    println!("restrict x = 1: {}", k.restrict(x, true));

    drop((f, g, h, k));
    let reclaimed = bdd.collect_garbage();
    println!("reclaimed {} nodes, stats: {}", reclaimed, bdd.stats());

    Ok(())
}
