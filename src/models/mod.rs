pub mod auth;
pub mod guest;
pub mod invitation;
pub mod song;

pub use guest::{
    ConfirmGuestRequest, ConfirmGuestsRequest, CreateGuestRequest, Guest, GuestConfirmation,
    GuestPatch, Menu, NewGuest, PlusOneRequest, TallyQuery,
};
pub use invitation::{CreateInvitationRequest, GuestNameQuery, Invitation, InvitationWithGuests};
pub use song::{NewSong, Song, UpdateSongRequest};
