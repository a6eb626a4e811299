use tracing::warn;

use crate::error::StoreError;
use crate::metabolism::calc::{self, ActivityLevel, FitnessGoal, Gender};
use crate::storage::BlobStore;

use super::dto::ProfileRequest;
use super::model::UserProfile;

const PROFILE_KEY: &str = "profile";

/// Loads the stored profile; an absent or unreadable blob reads as unset.
pub async fn load(store: &dyn BlobStore) -> Result<Option<UserProfile>, StoreError> {
    match store.get(PROFILE_KEY).await? {
        None => Ok(None),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "unreadable profile blob, treating as unset");
                Ok(None)
            }
        },
    }
}

/// Upserts the profile, recomputing the derived metrics from the
/// calculator before writing.
pub async fn save(store: &dyn BlobStore, req: ProfileRequest) -> Result<UserProfile, StoreError> {
    let gender = Gender::parse_lenient(&req.gender);
    let activity_level = ActivityLevel::parse_lenient(&req.activity_level);
    let fitness_goal = FitnessGoal::parse_lenient(&req.fitness_goal);

    let bmi = calc::calculate_bmi(req.weight_kg, req.height_cm);
    let bmr = calc::calculate_bmr(req.weight_kg, req.height_cm, req.age, gender);
    let tdee = calc::calculate_tdee(bmr, activity_level);
    let calorie_goal = calc::calculate_calorie_goal(tdee, fitness_goal);
    let macro_goals = calc::calculate_macro_goals(calorie_goal, fitness_goal, req.weight_kg);
    let water_l = calc::calculate_water_intake(req.weight_kg, Some(activity_level));

    let profile = UserProfile {
        name: req.name,
        age: req.age,
        gender,
        weight_kg: req.weight_kg,
        height_cm: req.height_cm,
        activity_level,
        fitness_goal,
        dietary_restrictions: req.dietary_restrictions.into_iter().collect(),
        bmi,
        bmr,
        tdee,
        calorie_goal,
        macro_goals,
        water_l,
    };
    let blob = serde_json::to_string(&profile).map_err(|e| StoreError::Storage(e.into()))?;
    store.set(PROFILE_KEY, &blob).await?;
    Ok(profile)
}

/// Removes the profile; idempotent.
pub async fn reset(store: &dyn BlobStore) -> Result<(), StoreError> {
    store.remove(PROFILE_KEY).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    fn request() -> ProfileRequest {
        ProfileRequest {
            name: "Dana".into(),
            age: 30,
            gender: "female".into(),
            weight_kg: 70.0,
            height_cm: 175.0,
            activity_level: "moderate".into(),
            fitness_goal: "lose".into(),
            dietary_restrictions: vec!["vegetarian".into(), "vegetarian".into()],
        }
    }

    #[tokio::test]
    async fn save_derives_metrics_and_roundtrips() {
        let store = MemoryBlobStore::default();
        let saved = save(&store, request()).await.expect("save profile");

        assert_eq!(saved.bmi, 22.9);
        assert_eq!(saved.bmr, 1482.75);
        assert!((saved.tdee - 1482.75 * 1.55).abs() < 1e-9);
        assert_eq!(saved.calorie_goal, (saved.tdee * 0.8).round());
        assert!(saved.macro_goals.protein_g > 0.0);
        assert!(saved.water_l > 0.0);
        // duplicate restrictions collapse into the set
        assert_eq!(saved.dietary_restrictions.len(), 1);

        let loaded = load(&store).await.expect("load profile");
        assert_eq!(loaded, Some(saved));
    }

    #[tokio::test]
    async fn unknown_enum_strings_fall_back() {
        let store = MemoryBlobStore::default();
        let mut req = request();
        req.gender = "nonbinary".into();
        req.activity_level = "extreme".into();
        req.fitness_goal = "recomp".into();
        let saved = save(&store, req).await.expect("save profile");
        assert_eq!(saved.gender, Gender::Other);
        assert_eq!(saved.activity_level, ActivityLevel::Sedentary);
        assert_eq!(saved.fitness_goal, FitnessGoal::Maintain);
    }

    #[tokio::test]
    async fn reset_clears_profile() {
        let store = MemoryBlobStore::default();
        save(&store, request()).await.expect("save profile");
        reset(&store).await.expect("reset");
        assert_eq!(load(&store).await.expect("load"), None);
        // resetting again is fine
        reset(&store).await.expect("reset again");
    }

    #[tokio::test]
    async fn corrupt_profile_reads_as_unset() {
        let store = MemoryBlobStore::default();
        store
            .set("profile", "not even close to json")
            .await
            .expect("seed corrupt blob");
        assert_eq!(load(&store).await.expect("load"), None);
    }
}
