/// Property-based tests for the ledger using proptest
///
/// These tests check that joins and settlements move exactly the points
/// the floor-division split says they do, and nothing at all on failure.
use proptest::prelude::*;
use social_tournament::store::{LedgerStore, MemoryLedgerStore};
use social_tournament::tournament::{TournamentManager, Winner, share_for, stake_for};
use social_tournament::wallet::WalletManager;

// Strategy for a set of funded players: (balance) per player index
fn balances_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..=2_000, 1..=6)
}

// Strategy for backer indices into the funded players, duplicates allowed
fn backer_indices_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..6, 0..=4)
}

fn player(index: usize) -> String {
    format!("P{index}")
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn test_stake_never_overcollects(deposit in 1i64..=1_000_000, backers in 0usize..50) {
        let stake = stake_for(deposit, backers);
        let participants = backers as i64 + 1;

        prop_assert!(stake >= 0);
        prop_assert!(stake * participants <= deposit);
        prop_assert!(deposit - stake * participants < participants);
    }

    #[test]
    fn test_share_never_overpays(prize in 0i64..=1_000_000, recipients in 1usize..50) {
        let share = share_for(prize, recipients);
        let count = recipients as i64;

        prop_assert!(share * count <= prize);
        prop_assert!(prize - share * count < count);
    }

    #[test]
    fn test_join_moves_exact_stake_or_nothing(
        balances in balances_strategy(),
        backer_indices in backer_indices_strategy(),
        deposit in 1i64..=3_000,
    ) {
        runtime().block_on(async {
            let store = MemoryLedgerStore::new();
            let wallet = WalletManager::new(store.clone());
            let tournaments = TournamentManager::new(store.clone());

            for (i, balance) in balances.iter().enumerate() {
                wallet.fund(&player(i), *balance).await.unwrap();
            }
            tournaments.announce("T", deposit).await.unwrap();

            // Indices past the funded range name players without accounts
            let backers: Vec<String> = backer_indices.iter().map(|i| player(*i)).collect();
            let before = store.total_balance().await;
            let outcome = tournaments.join("T", &player(0), backers.clone()).await;
            let after = store.total_balance().await;

            let stake = stake_for(deposit, backers.len());
            match outcome {
                Ok(entry) => {
                    prop_assert_eq!(before - after, stake * entry.participant_count() as i64);
                    prop_assert_eq!(store.entries("T").await.unwrap().len(), 1);
                }
                Err(_) => {
                    prop_assert_eq!(before, after);
                    prop_assert!(store.entries("T").await.unwrap().is_empty());
                }
            }

            for i in 0..balances.len() {
                prop_assert!(wallet.balance(&player(i)).await.unwrap().balance >= 0);
            }
            Ok(())
        })?;
    }

    #[test]
    fn test_settlement_pays_exact_shares(
        backer_count in 0usize..=5,
        prize in 0i64..=10_000,
    ) {
        runtime().block_on(async {
            let store = MemoryLedgerStore::new();
            let wallet = WalletManager::new(store.clone());
            let tournaments = TournamentManager::new(store.clone());

            for i in 0..=backer_count {
                wallet.fund(&player(i), 1_000).await.unwrap();
            }
            tournaments.announce("T", 600).await.unwrap();

            let backers: Vec<String> = (1..=backer_count).map(player).collect();
            tournaments.join("T", &player(0), backers).await.unwrap();

            let before = store.total_balance().await;
            let payouts = tournaments
                .result("T", &[Winner::new(player(0), prize)])
                .await
                .unwrap();
            let after = store.total_balance().await;

            let share = share_for(prize, backer_count + 1);
            prop_assert_eq!(payouts.len(), backer_count + 1);
            prop_assert!(payouts.iter().all(|p| p.points == share));
            prop_assert_eq!(after - before, share * (backer_count as i64 + 1));
            prop_assert!(after - before <= prize);

            // A second settlement never pays again
            let again = tournaments.result("T", &[Winner::new(player(0), prize)]).await;
            prop_assert!(again.is_err());
            prop_assert_eq!(store.total_balance().await, after);
            Ok(())
        })?;
    }
}
