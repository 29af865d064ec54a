use super::*;
use crate::testing::sample_user;

#[test]
fn display_name_prefers_profile_name() {
    assert_eq!(display_name(&sample_user()), "Riley Promoter");
}

#[test]
fn display_name_falls_back_to_email_when_name_is_blank() {
    let mut user = sample_user();
    user.name = "   ".to_owned();
    assert_eq!(display_name(&user), user.email);
}
