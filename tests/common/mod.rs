#![allow(dead_code)]

use iron_blood::scenario::Scenario;
use iron_blood::*;

/// The shared test map: five players, two owned territories.
///
/// Arthur starts with 1000 currency and owns Aglax; Brian starts with 11
/// wood1 and owns Efea. Dickens, Lancelot and Patsy start empty. Territory
/// land area is 10 throughout.
pub struct Game {
    pub ledger: Ledger,
    pub arthur: PlayerId,
    pub brian: PlayerId,
    pub dickens: PlayerId,
    pub lancelot: PlayerId,
    pub patsy: PlayerId,
    pub aglax: TerritoryId,
    pub efea: TerritoryId,
    pub cesta: TerritoryId,
}

pub fn build_test_game() -> Game {
    let mut s = Scenario::new();
    let arthur = s.player("arthur").give("currency", 1000).id();
    let brian = s.player("brian").give("wood1", 11).id();
    let dickens = s.add_player("dickens");
    let lancelot = s.add_player("lancelot");
    let patsy = s.add_player("patsy");

    let aglax = s.territory("Aglax", "AG").owner(arthur).land_area(10).id();
    let efea = s.territory("Efea", "EF").owner(brian).land_area(10).id();
    let cesta = s.territory("Cesta", "CE").land_area(10).id();

    Game {
        ledger: s.build(),
        arthur,
        brian,
        dickens,
        lancelot,
        patsy,
        aglax,
        efea,
        cesta,
    }
}

pub fn currency(n: i64) -> ResourceBundle {
    ResourceBundle::new().with("currency", n)
}

pub fn wood1(n: i64) -> ResourceBundle {
    ResourceBundle::new().with("wood1", n)
}

pub fn balance(ledger: &Ledger, player: PlayerId, commodity: &str) -> i64 {
    ledger.player(player).unwrap().resources.get(commodity)
}

pub fn owner(ledger: &Ledger, territory: TerritoryId) -> Option<PlayerId> {
    ledger.territory(territory).unwrap().owner
}

pub fn state(ledger: &Ledger, exchange: ExchangeId) -> ExchangeState {
    ledger.exchange(exchange).unwrap().state
}

pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// The test game after a short session: an accepted barter, a waiting gift,
/// a rejected offer, a bond issued against Aglax and one charter.
///
/// Journal: 8 events carrying 16 effects.
pub fn build_active_game() -> Game {
    let mut g = build_test_game();
    let (arthur, brian, dickens, lancelot, patsy, aglax) =
        (g.arthur, g.brian, g.dickens, g.lancelot, g.patsy, g.aglax);
    let ledger = &mut g.ledger;

    let barter = ledger
        .offer(
            Exchange::new(arthur, brian)
                .with_offeror(ExchangeSide::new().resources(currency(100)))
                .with_offeree(ExchangeSide::new().resources(wood1(10))),
            arthur,
        )
        .unwrap();
    ledger.accept(barter, brian).unwrap();

    ledger
        .offer(
            Exchange::new(arthur, patsy).with_offeror(ExchangeSide::new().resources(currency(50))),
            arthur,
        )
        .unwrap();

    let declined = ledger
        .offer(
            Exchange::new(brian, dickens).with_offeror(ExchangeSide::new().resources(wood1(1))),
            brian,
        )
        .unwrap();
    ledger.reject(declined, dickens).unwrap();

    let pledge = ledger
        .offer(
            Exchange::new(arthur, lancelot)
                .with_offeror(ExchangeSide::new().territory(aglax).as_bond(3)),
            arthur,
        )
        .unwrap();
    ledger.accept(pledge, lancelot).unwrap();

    let charter = ledger.grant_charter(arthur, aglax, dickens, 10).unwrap();
    ledger.commit_charter(charter).unwrap();

    g
}
